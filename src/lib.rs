//! HTTP helper utilities for CGI-style gateway environments.
//!
//! The gateway hands a request over as a flat map of environment variables
//! plus a per-field file-upload structure. This crate turns both into typed,
//! queryable values: a method and status-code registry, request headers
//! reconstructed from `HTTP_*` variables, a buffered response-header surface
//! with a send boundary, and a path-addressable tree of uploaded files.
//!
//! ```
//! use gateway_http::{GatewayEnv, RequestContext};
//! use serde_json::json;
//!
//! let env: GatewayEnv = [
//!     ("HTTP_ACCEPT".to_owned(), "application/json".to_owned()),
//!     ("CONTENT_TYPE".to_owned(), "multipart/form-data".to_owned()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let context = RequestContext::new(env, json!({}));
//! let headers = context.request_headers();
//! assert_eq!(headers.opt("accept"), Some("application/json"));
//! ```

pub mod error;
pub mod files;
pub mod headers;
pub mod method;
pub mod status;

pub use error::{HeaderError, HttpError};
pub use files::{
    FileMap, FileNode, FileSlot, FilesError, UploadError, UploadLeaf, UploadMap, UploadNode,
    UploadedFile,
};
pub use headers::{HeaderBuffer, HeaderSink, RequestHeaders, ResponseHeaderUtils};
pub use method::{Method, UnknownMethod};
pub use status::{StatusClass, StatusCode, UnknownStatusCode};

pub mod external {
    pub use http;
    pub use serde;
    pub use serde_json;
    pub use tracing;
}

use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde_json::Value;

/// The variables the gateway set for one request.
///
/// Callers under a real CGI-style gateway build this with
/// [`GatewayEnv::from_process_env`]; tests and embedded servers assemble it
/// by hand.
#[derive(Debug, Clone, Default)]
pub struct GatewayEnv {
    vars: BTreeMap<String, String>,
}

impl GatewayEnv {
    pub fn new() -> GatewayEnv {
        GatewayEnv::default()
    }

    /// Snapshots the current process environment.
    pub fn from_process_env() -> GatewayEnv {
        GatewayEnv {
            vars: std::env::vars().collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for GatewayEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> GatewayEnv {
        GatewayEnv {
            vars: iter.into_iter().collect(),
        }
    }
}

/// One request's worth of gateway state, with every derived view computed
/// lazily and at most once.
///
/// The context owns the raw inputs. Header parsing and file-tree reshaping
/// each run on first access and are memoized for the rest of the request,
/// including a failed reshape, which every later file accessor reproduces.
pub struct RequestContext {
    env: GatewayEnv,
    files: Value,
    headers: OnceCell<RequestHeaders>,
    reordered: OnceCell<Result<FileMap, FilesError>>,
    uploads: OnceCell<Result<UploadMap, FilesError>>,
}

impl RequestContext {
    pub fn new(env: GatewayEnv, files: Value) -> RequestContext {
        RequestContext {
            env,
            files,
            headers: OnceCell::new(),
            reordered: OnceCell::new(),
            uploads: OnceCell::new(),
        }
    }

    pub fn env(&self) -> &GatewayEnv {
        &self.env
    }

    /// The request headers, parsed from the environment on first call.
    pub fn request_headers(&self) -> &RequestHeaders {
        self.headers
            .get_or_init(|| RequestHeaders::from_env(&self.env))
    }

    /// The upload structure reshaped to field-first nesting, with file
    /// attributes grouped under each leaf.
    pub fn reordered_files(&self) -> Result<&FileMap, FilesError> {
        self.reordered
            .get_or_init(|| files::tree::reorder(&self.files))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The reshaped tree with every file record replaced by a typed slot.
    pub fn uploaded_files(&self) -> Result<&UploadMap, FilesError> {
        if let Some(cached) = self.uploads.get() {
            return cached.as_ref().map_err(Clone::clone);
        }
        let built = self
            .reordered_files()
            .map(files::uploaded::build_upload_tree);
        self.uploads
            .get_or_init(|| built)
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The file at `path`, validated, or `None` when the path is absent.
    /// A path leading to a group or a stray scalar is an error.
    pub fn opt_uploaded_file(&self, path: &[&str]) -> Result<Option<UploadedFile>, FilesError> {
        let tree = self.uploaded_files()?;
        match files::uploaded::walk(tree, path) {
            None => Ok(None),
            Some(UploadNode::File(slot)) => {
                slot.resolve().map(Some).map_err(FilesError::Upload)
            }
            Some(UploadNode::Branch(_)) | Some(UploadNode::Value(_)) => {
                Err(FilesError::NotAFile {
                    path: files::join_path(path),
                })
            }
        }
    }

    /// Like [`RequestContext::opt_uploaded_file`], but an absent path is an
    /// error too.
    pub fn get_uploaded_file(&self, path: &[&str]) -> Result<UploadedFile, FilesError> {
        match self.opt_uploaded_file(path)? {
            Some(file) => Ok(file),
            None => Err(FilesError::NotFound {
                path: files::join_path(path),
            }),
        }
    }

    /// Whether anything exists at `path`, file slot or group. A slot whose
    /// upload failed still counts as present.
    pub fn has_uploaded_file(&self, path: &[&str]) -> Result<bool, FilesError> {
        let tree = self.uploaded_files()?;
        Ok(files::uploaded::walk(tree, path).is_some())
    }
}
