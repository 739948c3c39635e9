//! Site icon workflow orchestration
//!
//! [`SiteIconManager`] drives the upload -> crop -> publish cycle for one
//! site at a time. Storage, settings and image editing are injected, and
//! every call carries an explicit [`SiteContext`].
//!
//! ```text
//! Idle / Committed ──begin──▶ AwaitingUpload ──preview──▶ AwaitingCrop ──commit──▶ Committed
//!                                   │                          │
//!                                   └──too small──▶ Idle ◀──cancel
//! ```

use std::path::Path;

use crate::config::{CommitStrategy, IconConfig};
use crate::error::{IconError, Result};
use crate::icon::codec::ImageEditor;
use crate::icon::geometry::{initial_crop_box, InitialCropBox};
use crate::icon::preview::{create_preview, import_upload};
use crate::icon::processor::{render_icon, render_master, render_variants};
use crate::markup;
use crate::state::data::{Asset, AssetId, CropSelection, PreviewImage, SiteContext, SiteIcon, SourceImage};
use crate::state::workflow::{WorkflowState, WorkflowStep, WORKFLOW_KEY};
use crate::state::{AssetStore, SettingsStore};

/// Settings key holding the current icon's asset ID
pub const ICON_KEY: &str = "site_icon_id";

/// Label shown next to the icon asset in a media listing
pub const MEDIA_STATE_LABEL: &str = "Site Icon";

/// Synchronous notifications from the workflow.
/// Both hooks default to doing nothing.
pub trait IconObserver {
    /// The current icon changed. `current` is None after a removal.
    fn on_icon_replaced(
        &self,
        _ctx: &SiteContext,
        _previous: Option<AssetId>,
        _current: Option<AssetId>,
    ) {
    }

    /// A pending crop was discarded without publishing
    fn on_workflow_abandoned(&self, _ctx: &SiteContext, _state: &WorkflowState) {}
}

/// Where the image for a new icon comes from
#[derive(Debug, Clone)]
pub enum UploadSource<'p> {
    /// A freshly uploaded file and the name the user gave it
    File { path: &'p Path, name: String },
    /// An image already in the asset catalog
    Existing(AssetId),
}

/// Everything the crop page needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct CropPage {
    pub source: SourceImage,
    pub preview: PreviewImage,
    pub crop_box: InitialCropBox,
}

pub struct SiteIconManager<'a> {
    assets: &'a dyn AssetStore,
    settings: &'a dyn SettingsStore,
    editor: &'a dyn ImageEditor,
    config: IconConfig,
    observers: Vec<Box<dyn IconObserver + 'a>>,
}

impl<'a> SiteIconManager<'a> {
    pub fn new(
        assets: &'a dyn AssetStore,
        settings: &'a dyn SettingsStore,
        editor: &'a dyn ImageEditor,
        config: IconConfig,
    ) -> Self {
        Self {
            assets,
            settings,
            editor,
            config,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn IconObserver + 'a>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    // ========== Workflow ==========

    /// Current step, derived from what is persisted for the site
    pub fn status(&self, ctx: &SiteContext) -> Result<WorkflowStep> {
        let has_workflow = self.settings.get_option(ctx, WORKFLOW_KEY)?.is_some();
        let has_icon = self.current_icon_id(ctx)?.is_some();
        Ok(WorkflowStep::from_persisted(has_workflow, has_icon))
    }

    /// The workflow waiting for a crop, if any
    pub fn pending_workflow(&self, ctx: &SiteContext) -> Result<Option<WorkflowState>> {
        let Some(json) = self.settings.get_option(ctx, WORKFLOW_KEY)? else {
            return Ok(None);
        };
        match WorkflowState::from_json(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!("⚠️  Dropping unreadable workflow state: {}", e);
                self.settings.delete_option(ctx, WORKFLOW_KEY)?;
                Ok(None)
            }
        }
    }

    /// Upload/resize stage.
    ///
    /// Any earlier unfinished workflow is discarded first. Recoverable
    /// errors (`UnsupportedType`, `TooSmall`) leave no partial state behind.
    pub fn begin(&self, ctx: &SiteContext, source: UploadSource<'_>) -> Result<CropPage> {
        let step = self.advance(ctx, self.status(ctx)?, WorkflowStep::AwaitingUpload)?;
        self.abandon(ctx)?;

        let (source, uploaded) = match source {
            UploadSource::File { path, name } => {
                (import_upload(self.editor, self.assets, ctx, path, &name)?, true)
            }
            UploadSource::Existing(id) => {
                let asset = self
                    .assets
                    .get_asset(id)?
                    .filter(|asset| asset.site_id == ctx.site_id)
                    .ok_or_else(|| IconError::not_found(format!("Asset {} does not exist", id)))?;
                (asset, false)
            }
        };

        let preview = match create_preview(self.editor, self.assets, ctx, &source, &self.config) {
            Ok(preview) => preview,
            Err(e) => {
                if uploaded {
                    self.delete_quietly(source.id);
                }
                return Err(e);
            }
        };

        let state = WorkflowState::new(SourceImage::from(&source), uploaded, preview);
        if let Err(e) = self.save_workflow(ctx, &state) {
            self.delete_temporary(&state);
            return Err(e);
        }
        self.advance(ctx, step, WorkflowStep::AwaitingCrop)?;

        let crop_box = initial_crop_box(
            state.preview.width,
            state.preview.height,
            self.config.page_crop,
            self.config.min_size,
            state.scale_ratio(),
        );

        Ok(CropPage {
            source: state.source,
            preview: state.preview,
            crop_box,
        })
    }

    /// Crop/commit stage.
    ///
    /// The pending workflow and its temporary files are gone afterwards,
    /// whether or not the commit succeeded.
    pub fn commit(&self, ctx: &SiteContext, selection: &CropSelection) -> Result<SiteIcon> {
        let current = self.status(ctx)?;
        if !current.can_transition_to(WorkflowStep::Committed) {
            return Err(IconError::not_found("No site icon upload is waiting to be cropped"));
        }
        let state = self
            .pending_workflow(ctx)?
            .ok_or_else(|| IconError::not_found("No site icon upload is waiting to be cropped"))?;

        let result = self.publish(ctx, &state, selection);
        self.finish(ctx, &state);

        if let Err(e) = &result {
            tracing::warn!("⚠️  Site icon commit failed: {}", e);
        }
        result
    }

    /// Explicit cancel from the crop page.
    /// Returns false when nothing was pending.
    pub fn cancel(&self, ctx: &SiteContext) -> Result<bool> {
        self.abandon(ctx)
    }

    fn publish(
        &self,
        ctx: &SiteContext,
        state: &WorkflowState,
        selection: &CropSelection,
    ) -> Result<SiteIcon> {
        if self.assets.get_asset(state.source.id)?.is_none() {
            return Err(IconError::not_found(format!(
                "Source image {} no longer exists",
                state.source.id
            )));
        }

        let preview = &state.preview;
        if selection.is_empty() || !selection.fits_within(preview.width, preview.height) {
            return Err(IconError::processing(format!(
                "Crop ({}, {}, {}x{}) does not fit the {}x{} preview",
                selection.x, selection.y, selection.width, selection.height, preview.width, preview.height
            )));
        }

        let previous = self.current_icon_id(ctx)?;

        let icon = match self.config.commit_strategy {
            CommitStrategy::DeleteThenWrite => {
                let master = render_master(self.editor, self.assets, ctx, state, selection, &self.config)?;
                let master_id = master.id;
                match self.replace_current(ctx, previous, master) {
                    Ok(icon) => icon,
                    Err(e) => {
                        self.delete_quietly(master_id);
                        return Err(e);
                    }
                }
            }
            CommitStrategy::WriteThenSwap => {
                let icon = render_icon(self.editor, self.assets, ctx, state, selection, &self.config)?;
                if let Err(e) = self.settings.set_option(ctx, ICON_KEY, &icon.id().to_string()) {
                    self.delete_quietly(icon.id());
                    return Err(e);
                }
                if let Some(previous) = previous {
                    self.delete_quietly(previous);
                }
                icon
            }
        };

        tracing::info!("🎉 Site icon {} published for site {}", icon.id(), ctx.site_id);
        for observer in &self.observers {
            observer.on_icon_replaced(ctx, previous, Some(icon.id()));
        }
        Ok(icon)
    }

    /// Delete the previous icon, finish the new one and point at it
    fn replace_current(&self, ctx: &SiteContext, previous: Option<AssetId>, master: Asset) -> Result<SiteIcon> {
        if let Some(previous) = previous {
            self.assets.delete_asset(previous)?;
            self.settings.delete_option(ctx, ICON_KEY)?;
        }
        let icon = render_variants(self.editor, self.assets, master, &self.config)?;
        self.settings.set_option(ctx, ICON_KEY, &icon.id().to_string())?;
        Ok(icon)
    }

    fn advance(&self, ctx: &SiteContext, from: WorkflowStep, to: WorkflowStep) -> Result<WorkflowStep> {
        if !from.can_transition_to(to) {
            return Err(IconError::InvalidRequest(format!("Cannot go from {:?} to {:?}", from, to)));
        }
        tracing::debug!("Site {}: {:?} -> {:?}", ctx.site_id, from, to);
        Ok(to)
    }

    /// Step 1. Fails only when the site cannot start a new upload.
    pub fn select_file(&self, ctx: &SiteContext) -> Result<WorkflowStep> {
        self.advance(ctx, self.status(ctx)?, WorkflowStep::AwaitingUpload)
    }

    fn save_workflow(&self, ctx: &SiteContext, state: &WorkflowState) -> Result<()> {
        let json = state.to_json()?;
        self.settings.set_option(ctx, WORKFLOW_KEY, &json)
    }

    /// Drop a pending workflow without publishing and tell observers
    fn abandon(&self, ctx: &SiteContext) -> Result<bool> {
        let Some(state) = self.pending_workflow(ctx)? else {
            return Ok(false);
        };
        tracing::info!("🧹 Discarding unfinished site icon upload {}", state.source.id);
        self.finish(ctx, &state);
        for observer in &self.observers {
            observer.on_workflow_abandoned(ctx, &state);
        }
        Ok(true)
    }

    /// Remove the workflow's temporary assets and its settings entry.
    /// Cleanup failures are logged, never returned.
    fn finish(&self, ctx: &SiteContext, state: &WorkflowState) {
        self.delete_temporary(state);
        if let Err(e) = self.settings.delete_option(ctx, WORKFLOW_KEY) {
            tracing::warn!("⚠️  Could not clear workflow state: {}", e);
        }
    }

    fn delete_temporary(&self, state: &WorkflowState) {
        for id in state.temporary_assets() {
            self.delete_quietly(id);
        }
    }

    fn delete_quietly(&self, id: AssetId) {
        if let Err(e) = self.assets.delete_asset(id) {
            tracing::warn!("⚠️  Could not delete asset {}: {}", id, e);
        }
    }

    // ========== Current icon ==========

    pub fn current_icon_id(&self, ctx: &SiteContext) -> Result<Option<AssetId>> {
        let Some(value) = self.settings.get_option(ctx, ICON_KEY)? else {
            return Ok(None);
        };
        match value.trim().parse::<AssetId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring malformed {} value {:?}", ICON_KEY, value);
                Ok(None)
            }
        }
    }

    /// The published icon, or None if no icon is set or its asset is gone
    pub fn current_icon(&self, ctx: &SiteContext) -> Result<Option<SiteIcon>> {
        let Some(id) = self.current_icon_id(ctx)? else {
            return Ok(None);
        };
        let Some(master) = self.assets.get_asset(id)? else {
            return Ok(None);
        };
        let variants = self.assets.variants(id)?;
        Ok(Some(SiteIcon { master, variants }))
    }

    /// Delete the current icon and clear the pointer.
    /// Removing when no icon is set succeeds and does nothing.
    pub fn remove(&self, ctx: &SiteContext) -> Result<bool> {
        let Some(id) = self.current_icon_id(ctx)? else {
            return Ok(false);
        };

        self.assets.delete_asset(id)?;
        self.settings.delete_option(ctx, ICON_KEY)?;
        tracing::info!("🗑️  Site icon {} removed from site {}", id, ctx.site_id);

        for observer in &self.observers {
            observer.on_icon_replaced(ctx, Some(id), None);
        }
        Ok(true)
    }

    /// Called when the host deletes an asset on its own. Clears the
    /// pointer if it referenced that asset, otherwise does nothing.
    pub fn forget_asset(&self, ctx: &SiteContext, id: AssetId) -> Result<bool> {
        if self.current_icon_id(ctx)? != Some(id) {
            return Ok(false);
        }
        self.settings.delete_option(ctx, ICON_KEY)?;
        tracing::info!("Site icon asset {} deleted externally", id);

        for observer in &self.observers {
            observer.on_icon_replaced(ctx, Some(id), None);
        }
        Ok(true)
    }

    /// URL of the closest variant at least `size` pixels wide, the master
    /// for sizes at or above the master size, or None without an icon.
    pub fn site_icon_url(&self, ctx: &SiteContext, size: u32) -> Result<Option<String>> {
        Ok(self
            .current_icon(ctx)?
            .map(|icon| icon.url_for_size(size).to_string()))
    }

    pub fn has_site_icon(&self, ctx: &SiteContext) -> Result<bool> {
        Ok(self.site_icon_url(ctx, self.config.min_size)?.is_some())
    }

    /// `<img>` tag for the icon at `size`, or None without an icon
    pub fn site_icon_img(&self, ctx: &SiteContext, size: u32, alt: Option<&str>) -> Result<Option<String>> {
        Ok(self
            .current_icon(ctx)?
            .map(|icon| markup::img_tag(&icon, size, alt)))
    }

    /// Document head tags; empty without an icon
    pub fn head_tags(&self, ctx: &SiteContext) -> Result<Vec<String>> {
        Ok(self
            .current_icon(ctx)?
            .map(|icon| markup::head_tags(&icon))
            .unwrap_or_default())
    }

    /// "Site Icon" for the asset currently used as the icon
    pub fn media_state(&self, ctx: &SiteContext, id: AssetId) -> Result<Option<&'static str>> {
        Ok((self.current_icon_id(ctx)? == Some(id)).then_some(MEDIA_STATE_LABEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::codec::RasterEditor;
    use crate::state::library::Library;
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        replaced: RefCell<Vec<(Option<AssetId>, Option<AssetId>)>>,
        abandoned: RefCell<Vec<AssetId>>,
    }

    struct SharedRecorder(Rc<Recorder>);

    impl IconObserver for SharedRecorder {
        fn on_icon_replaced(&self, _ctx: &SiteContext, previous: Option<AssetId>, current: Option<AssetId>) {
            self.0.replaced.borrow_mut().push((previous, current));
        }

        fn on_workflow_abandoned(&self, _ctx: &SiteContext, state: &WorkflowState) {
            self.0.abandoned.borrow_mut().push(state.source.id);
        }
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 200]))
            .save(&path)
            .unwrap();
        path
    }

    fn upload<'p>(path: &'p Path) -> UploadSource<'p> {
        UploadSource::File {
            path,
            name: "logo.png".to_string(),
        }
    }

    #[test]
    fn test_begin_then_commit() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 1024, 768);

        assert_eq!(manager.status(&ctx).unwrap(), WorkflowStep::Idle);
        let page = manager.begin(&ctx, upload(&file)).unwrap();
        assert_eq!((page.preview.width, page.preview.height), (512, 384));
        assert_eq!(page.crop_box.init_size, 384);
        assert_eq!(manager.status(&ctx).unwrap(), WorkflowStep::AwaitingCrop);

        let icon = manager.commit(&ctx, &CropSelection::new(64, 0, 384, 384)).unwrap();
        assert_eq!((icon.master.width, icon.master.height), (512, 512));
        assert_eq!(manager.status(&ctx).unwrap(), WorkflowStep::Committed);
        assert_eq!(manager.current_icon_id(&ctx).unwrap(), Some(icon.id()));

        // preview and uploaded source are gone
        assert!(library.get_asset(page.preview.id).unwrap().is_none());
        assert!(library.get_asset(page.source.id).unwrap().is_none());
        assert!(manager.pending_workflow(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_select_file_and_commit_follow_the_steps() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();

        assert_eq!(manager.select_file(&ctx).unwrap(), WorkflowStep::AwaitingUpload);
        // nothing uploaded yet
        assert!(matches!(
            manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)),
            Err(IconError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 512, 512);

        manager.begin(&ctx, upload(&file)).unwrap();
        let err = manager.commit(&ctx, &CropSelection::new(10, 10, 0, 100)).unwrap_err();
        assert!(matches!(err, IconError::ImageProcessing(_)));
        assert_eq!(manager.current_icon_id(&ctx).unwrap(), None);
        assert_eq!(std::fs::read_dir(library.upload_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_existing_asset_of_another_site_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let main = SiteContext::new(1);
        let other = SiteContext::new(2);
        let file = write_png(dir.path(), "in.png", 600, 600);
        let existing = import_upload(&RasterEditor, &library, &main, &file, "photo.png").unwrap();

        assert!(matches!(
            manager.begin(&other, UploadSource::Existing(existing.id)),
            Err(IconError::NotFound(_))
        ));
        assert_eq!(manager.status(&other).unwrap(), WorkflowStep::Idle);
        assert!(manager.begin(&main, UploadSource::Existing(existing.id)).is_ok());
    }

    #[test]
    fn test_too_small_upload_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "small.png", 400, 600);

        let err = manager.begin(&ctx, upload(&file)).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("width"));
        assert_eq!(std::fs::read_dir(library.upload_dir()).unwrap().count(), 0);
        assert_eq!(manager.status(&ctx).unwrap(), WorkflowStep::Idle);
    }

    #[test]
    fn test_existing_library_image_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 600, 600);
        let existing = import_upload(&RasterEditor, &library, &ctx, &file, "photo.png").unwrap();

        manager.begin(&ctx, UploadSource::Existing(existing.id)).unwrap();
        manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();

        assert!(library.get_asset(existing.id).unwrap().is_some());
        assert!(Path::new(&existing.path).exists());
    }

    #[test]
    fn test_begin_purges_previous_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let recorder = Rc::new(Recorder::default());
        let mut manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        manager.add_observer(Box::new(SharedRecorder(recorder.clone())));
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 700, 700);

        let first = manager.begin(&ctx, upload(&file)).unwrap();
        let second = manager.begin(&ctx, upload(&file)).unwrap();

        assert!(library.get_asset(first.preview.id).unwrap().is_none());
        assert!(library.get_asset(first.source.id).unwrap().is_none());
        assert!(library.get_asset(second.preview.id).unwrap().is_some());
        assert_eq!(*recorder.abandoned.borrow(), vec![first.source.id]);
    }

    #[test]
    fn test_cancel_tears_down_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 600, 600);

        let page = manager.begin(&ctx, upload(&file)).unwrap();
        assert!(manager.cancel(&ctx).unwrap());
        assert!(!manager.cancel(&ctx).unwrap());
        assert!(library.get_asset(page.preview.id).unwrap().is_none());
        assert_eq!(std::fs::read_dir(library.upload_dir()).unwrap().count(), 0);

        assert!(matches!(
            manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)),
            Err(IconError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_crop_keeps_existing_icon() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 512, 512);

        manager.begin(&ctx, upload(&file)).unwrap();
        let icon = manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();

        manager.begin(&ctx, upload(&file)).unwrap();
        // starts outside the preview
        let err = manager.commit(&ctx, &CropSelection::new(600, 0, 10, 10)).unwrap_err();
        assert!(matches!(err, IconError::ImageProcessing(_)));

        assert_eq!(manager.current_icon_id(&ctx).unwrap(), Some(icon.id()));
        assert!(Path::new(&icon.master.path).exists());
        assert!(manager.pending_workflow(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_replacing_deletes_previous_icon() {
        for strategy in [CommitStrategy::DeleteThenWrite, CommitStrategy::WriteThenSwap] {
            let dir = tempfile::tempdir().unwrap();
            let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
            let config = IconConfig {
                commit_strategy: strategy,
                ..IconConfig::default()
            };
            let recorder = Rc::new(Recorder::default());
            let mut manager = SiteIconManager::new(&library, &library, &RasterEditor, config);
            manager.add_observer(Box::new(SharedRecorder(recorder.clone())));
            let ctx = SiteContext::default();
            let file = write_png(dir.path(), "in.png", 512, 512);

            manager.begin(&ctx, upload(&file)).unwrap();
            let old = manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();
            manager.begin(&ctx, upload(&file)).unwrap();
            let new = manager.commit(&ctx, &CropSelection::new(0, 0, 256, 256)).unwrap();

            assert_ne!(old.id(), new.id());
            assert!(library.get_asset(old.id()).unwrap().is_none());
            assert!(!Path::new(&old.master.path).exists());
            for variant in &old.variants {
                assert!(!Path::new(&variant.path).exists());
            }
            assert_eq!(manager.current_icon_id(&ctx).unwrap(), Some(new.id()));
            assert_eq!(
                *recorder.replaced.borrow(),
                vec![(None, Some(old.id())), (Some(old.id()), Some(new.id()))]
            );
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 512, 512);

        manager.begin(&ctx, upload(&file)).unwrap();
        let icon = manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();

        assert!(manager.remove(&ctx).unwrap());
        assert!(!manager.remove(&ctx).unwrap());
        assert!(manager.current_icon(&ctx).unwrap().is_none());
        assert!(!Path::new(&icon.master.path).exists());
        assert_eq!(manager.site_icon_url(&ctx, 32).unwrap(), None);
        assert!(manager.head_tags(&ctx).unwrap().is_empty());
        assert_eq!(manager.site_icon_img(&ctx, 64, None).unwrap(), None);
    }

    #[test]
    fn test_public_markup_follows_current_icon() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 512, 512);

        manager.begin(&ctx, upload(&file)).unwrap();
        let icon = manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();

        let tags = manager.head_tags(&ctx).unwrap();
        assert_eq!(tags.len(), 3);
        assert!(tags[0].contains(&icon.variants[2].url));
        let img = manager.site_icon_img(&ctx, 180, Some("Logo")).unwrap().unwrap();
        assert!(img.contains(&icon.variants[1].url));
        assert!(img.contains("alt='Logo'"));
    }

    #[test]
    fn test_forget_asset_only_clears_matching_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory(&dir.path().join("uploads"), "/uploads").unwrap();
        let manager = SiteIconManager::new(&library, &library, &RasterEditor, IconConfig::default());
        let ctx = SiteContext::default();
        let file = write_png(dir.path(), "in.png", 512, 512);

        manager.begin(&ctx, upload(&file)).unwrap();
        let icon = manager.commit(&ctx, &CropSelection::new(0, 0, 512, 512)).unwrap();

        assert!(!manager.forget_asset(&ctx, icon.id() + 100).unwrap());
        assert_eq!(manager.media_state(&ctx, icon.id()).unwrap(), Some("Site Icon"));
        assert!(manager.forget_asset(&ctx, icon.id()).unwrap());
        assert_eq!(manager.current_icon_id(&ctx).unwrap(), None);
        assert_eq!(manager.media_state(&ctx, icon.id()).unwrap(), None);
    }
}
