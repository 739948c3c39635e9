//! Admin page requests
//!
//! The admin surface is three steps plus two actions:
//!
//! | parameters                          | request                |
//! |-------------------------------------|------------------------|
//! | `step=1` (or nothing)               | select a file          |
//! | `step=2` + upload or `file=<id>`    | show the crop page     |
//! | `step=3&crop-x=..&crop-y=..&..`     | crop and publish       |
//! | `action=cancel`                     | drop the pending crop  |
//! | `action=remove`                     | delete the current icon|

use std::path::PathBuf;

use crate::error::{IconError, Result};
use crate::manager::{CropPage, SiteIconManager, UploadSource};
use crate::state::data::{AssetId, CropSelection, SiteContext, SiteIcon};
use crate::state::workflow::WorkflowStep;

/// A file received with the request
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Where the host stored the upload
    pub path: PathBuf,
    /// Name the user's file had
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CropSource {
    Upload(UploadedFile),
    Existing(AssetId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminRequest {
    SelectFile,
    Crop(CropSource),
    Commit(CropSelection),
    Cancel,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminResponse {
    /// Step 1, with a message when sent back because of a rejected image.
    /// `step` is `AwaitingUpload` for a fresh visit.
    SelectFile {
        message: Option<String>,
        step: WorkflowStep,
    },
    /// Step 2
    CropPage(CropPage),
    /// Step 3
    Published(SiteIcon),
    Cancelled { pending: bool },
    Removed { existed: bool },
}

fn param<'q>(query: &'q [(String, String)], name: &str) -> Option<&'q str> {
    query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn int_param(query: &[(String, String)], name: &str) -> Result<u32> {
    let raw = param(query, name)
        .ok_or_else(|| IconError::InvalidRequest(format!("missing {}", name)))?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| IconError::InvalidRequest(format!("{} must be a non-negative integer, got {:?}", name, raw)))
}

impl AdminRequest {
    /// Build a request from query/form parameters and an optional upload.
    /// Actions take precedence over steps; unknown steps fall back to step 1.
    pub fn from_query(query: &[(String, String)], upload: Option<UploadedFile>) -> Result<Self> {
        match param(query, "action") {
            Some("remove") => return Ok(AdminRequest::Remove),
            Some("cancel") => return Ok(AdminRequest::Cancel),
            Some(other) => {
                return Err(IconError::InvalidRequest(format!("unknown action {:?}", other)));
            }
            None => {}
        }

        match param(query, "step").map(str::trim) {
            Some("2") => {
                if let Some(file) = param(query, "file") {
                    let id = file
                        .trim()
                        .parse::<AssetId>()
                        .map_err(|_| IconError::InvalidRequest(format!("file must be an asset ID, got {:?}", file)))?;
                    return Ok(AdminRequest::Crop(CropSource::Existing(id)));
                }
                upload
                    .map(|file| AdminRequest::Crop(CropSource::Upload(file)))
                    .ok_or_else(|| IconError::InvalidRequest("no file was uploaded or chosen".into()))
            }
            Some("3") => Ok(AdminRequest::Commit(CropSelection::new(
                int_param(query, "crop-x")?,
                int_param(query, "crop-y")?,
                int_param(query, "crop-w")?,
                int_param(query, "crop-h")?,
            ))),
            _ => Ok(AdminRequest::SelectFile),
        }
    }
}

/// Run a request against the manager.
///
/// Rejected images send the user back to step 1 with a message; other
/// errors end the request.
pub fn dispatch(
    manager: &SiteIconManager<'_>,
    ctx: &SiteContext,
    request: AdminRequest,
) -> Result<AdminResponse> {
    match request {
        AdminRequest::SelectFile => Ok(AdminResponse::SelectFile {
            message: None,
            step: manager.select_file(ctx)?,
        }),
        AdminRequest::Crop(source) => {
            let source = match &source {
                CropSource::Upload(file) => UploadSource::File {
                    path: &file.path,
                    name: file.name.clone(),
                },
                CropSource::Existing(id) => UploadSource::Existing(*id),
            };
            match manager.begin(ctx, source) {
                Ok(page) => Ok(AdminResponse::CropPage(page)),
                Err(e) if e.is_recoverable() => Ok(AdminResponse::SelectFile {
                    message: Some(e.to_string()),
                    step: manager.status(ctx)?,
                }),
                Err(e) => Err(e),
            }
        }
        AdminRequest::Commit(selection) => manager.commit(ctx, &selection).map(AdminResponse::Published),
        AdminRequest::Cancel => Ok(AdminResponse::Cancelled {
            pending: manager.cancel(ctx)?,
        }),
        AdminRequest::Remove => Ok(AdminResponse::Removed {
            existed: manager.remove(ctx)?,
        }),
    }
}
