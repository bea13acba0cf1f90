//! Reshaping of the gateway's multi-file upload structure and typed access
//! to the uploaded files inside it.
//!
//! Gateways deliver uploads grouped by attribute: for a form field named
//! `user[info][avatar]` the raw structure holds `user.name.info.avatar`,
//! `user.size.info.avatar` and so on, mirroring the field hierarchy once per
//! attribute. [`tree::reorder`] transposes that into one tree keyed by field
//! path with the attributes collected at the leaves
//! (`user.info.avatar.{name,size,...}`), and [`uploaded`] turns every
//! leaf-shaped record into a resolvable file slot.

pub mod tree;
pub mod uploaded;

use thiserror::Error;

pub use tree::{FileMap, FileNode};
pub use uploaded::{FileSlot, UploadError, UploadLeaf, UploadMap, UploadNode, UploadedFile, NO_ERROR};

/// Upload-structure failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilesError {
    /// The raw gateway structure does not have the expected shape.
    #[error("malformed upload structure at '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// Two attributes of the same field disagree about the field hierarchy.
    #[error("upload attributes have inconsistent nesting at '{path}'")]
    ShapeMismatch { path: String },

    /// No uploaded file exists at the addressed path.
    #[error("no uploaded file at '{path}'")]
    NotFound { path: String },

    /// The path addresses a group of fields or a bare value, not a file.
    #[error("'{path}' does not address an uploaded file")]
    NotAFile { path: String },

    /// The file at the addressed path failed to upload.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub(crate) fn join_path(path: &[&str]) -> String {
    path.join(".")
}
