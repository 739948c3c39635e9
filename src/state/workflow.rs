/// Two-step crop workflow state
///
/// The upload step and the crop step run in separate requests, so
/// everything the crop step needs is stored between them as JSON
/// in the settings store.

use serde::{Deserialize, Serialize};

use super::data::{AssetId, PreviewImage, SourceImage};

/// Settings key holding the pending workflow
pub const WORKFLOW_KEY: &str = "site_icon_temp_data";

/// Where a site is in the upload -> crop -> publish cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// No icon and nothing pending
    Idle,
    /// Showing the file selection page
    AwaitingUpload,
    /// A preview exists and the crop page is waiting for a selection
    AwaitingCrop,
    /// An icon is published and nothing is pending
    Committed,
}

impl WorkflowStep {
    /// Derive the step from what is persisted
    pub fn from_persisted(has_workflow: bool, has_icon: bool) -> Self {
        match (has_workflow, has_icon) {
            (true, _) => WorkflowStep::AwaitingCrop,
            (false, true) => WorkflowStep::Committed,
            (false, false) => WorkflowStep::Idle,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: WorkflowStep) -> bool {
        use WorkflowStep::*;
        matches!(
            (self, next),
            (Idle, AwaitingUpload)
                | (Committed, AwaitingUpload)
                | (AwaitingUpload, AwaitingCrop)
                | (AwaitingUpload, Idle)
                | (AwaitingCrop, Committed)
                | (AwaitingCrop, Idle)
                // starting over discards the pending crop
                | (AwaitingCrop, AwaitingUpload)
        )
    }
}

/// Binds a source image to its preview across the two requests
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub source: SourceImage,
    /// True when the source was uploaded by this workflow and should be
    /// removed with it. Library images picked by ID are left alone.
    pub source_uploaded: bool,
    pub preview: PreviewImage,
    /// Unix timestamp of the upload step
    pub created_at: i64,
}

impl WorkflowState {
    pub fn new(source: SourceImage, source_uploaded: bool, preview: PreviewImage) -> Self {
        Self {
            source,
            source_uploaded,
            preview,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn scale_ratio(&self) -> f64 {
        self.preview.scale_ratio
    }

    /// Assets that must be deleted when the workflow ends
    pub fn temporary_assets(&self) -> Vec<AssetId> {
        let mut ids = vec![self.preview.id];
        if self.source_uploaded {
            ids.push(self.source.id);
        }
        ids
    }

    /// Convert to JSON string for settings storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from settings)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
