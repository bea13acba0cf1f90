use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::tree::{FileMap, FileNode};
use super::FilesError;

/// The upload error code meaning the file arrived intact.
pub const NO_ERROR: i64 = 0;

/// A classified upload failure, carrying the gateway's numeric error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Code 1: the file exceeds the size limit configured on the server.
    #[error("the uploaded file exceeds the server size limit")]
    ExceedsServerLimit,

    /// Code 2: the file exceeds the size limit declared in the HTML form.
    #[error("the uploaded file exceeds the size limit declared in the form")]
    ExceedsFormLimit,

    /// Code 3: the file was only partially uploaded.
    #[error("the file was only partially uploaded")]
    Partial,

    /// Code 4: no file was uploaded.
    #[error("no file was uploaded")]
    NoFile,

    /// Code 6: the gateway has no temporary directory to store uploads in.
    #[error("missing a temporary directory for uploads")]
    MissingTempDir,

    /// Code 7: the gateway failed to write the file to disk.
    #[error("failed to write the uploaded file to disk")]
    WriteFailed,

    /// Code 8: an extension stopped the upload.
    #[error("the upload was stopped by an extension")]
    StoppedByExtension,

    /// Any code this registry does not recognize.
    #[error("unknown upload error (code {0})")]
    Unknown(i64),
}

impl UploadError {
    /// Classifies a non-zero gateway error code.
    pub fn from_code(code: i64) -> UploadError {
        match code {
            1 => UploadError::ExceedsServerLimit,
            2 => UploadError::ExceedsFormLimit,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::MissingTempDir,
            7 => UploadError::WriteFailed,
            8 => UploadError::StoppedByExtension,
            other => UploadError::Unknown(other),
        }
    }

    /// The numeric gateway code this error was classified from.
    pub fn code(self) -> i64 {
        match self {
            UploadError::ExceedsServerLimit => 1,
            UploadError::ExceedsFormLimit => 2,
            UploadError::Partial => 3,
            UploadError::NoFile => 4,
            UploadError::MissingTempDir => 6,
            UploadError::WriteFailed => 7,
            UploadError::StoppedByExtension => 8,
            UploadError::Unknown(code) => code,
        }
    }
}

/// The raw attributes of one uploaded file, before validation of its error
/// code. `name`, `size`, `tmp_name` and `error` are required; `type` is the
/// client-supplied MIME type and may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLeaf {
    pub name: String,
    pub mime_type: Option<String>,
    pub size: u64,
    pub tmp_name: String,
    pub error: i64,
}

impl UploadLeaf {
    /// Extracts a leaf from a raw attribute record. Returns `None` when a
    /// required key is missing or ill-typed, or when `type` is present but
    /// not a string. Unknown keys are ignored.
    pub fn from_record(record: &serde_json::Map<String, Value>) -> Option<UploadLeaf> {
        let mime_type = match record.get("type") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return None,
        };
        Some(UploadLeaf {
            name: record.get("name")?.as_str()?.to_owned(),
            mime_type,
            size: record.get("size")?.as_u64()?,
            tmp_name: record.get("tmp_name")?.as_str()?.to_owned(),
            error: record.get("error")?.as_i64()?,
        })
    }

    /// Extracts a leaf from a reshaped branch whose terminal values are
    /// scalars. Same rules as [`UploadLeaf::from_record`]; nested branches
    /// never type-check as attributes.
    pub(crate) fn from_branch(branch: &FileMap) -> Option<UploadLeaf> {
        let record: serde_json::Map<String, Value> = branch
            .iter()
            .filter_map(|(key, node)| node.as_value().map(|v| (key.clone(), v.clone())))
            .collect();
        // A branch nested under a required key (or under "type") must make
        // the shape invalid, not fall back to "absent".
        for key in ["name", "type", "size", "tmp_name", "error"] {
            if matches!(branch.get(key), Some(FileNode::Branch(_))) {
                return None;
            }
        }
        UploadLeaf::from_record(&record)
    }

    /// Whether a raw record has the shape of an upload leaf.
    pub fn is_valid_record(record: &serde_json::Map<String, Value>) -> bool {
        UploadLeaf::from_record(record).is_some()
    }
}

/// A file the user uploaded and the gateway accepted. The temporary path is
/// reported as the gateway stored it; this crate does not manage the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    name: String,
    mime_type: Option<String>,
    size: u64,
    tmp_path: PathBuf,
}

impl UploadedFile {
    /// Validates a leaf's error code and builds the typed handle.
    pub fn from_leaf(leaf: &UploadLeaf) -> Result<UploadedFile, UploadError> {
        if leaf.error == NO_ERROR {
            Ok(UploadedFile {
                name: leaf.name.clone(),
                mime_type: leaf.mime_type.clone(),
                size: leaf.size,
                tmp_path: PathBuf::from(&leaf.tmp_name),
            })
        } else {
            Err(UploadError::from_code(leaf.error))
        }
    }

    /// Builds the handle straight from a raw attribute record, for callers
    /// holding gateway data that never went through the reshaper.
    pub fn from_value(value: &Value) -> Result<UploadedFile, FilesError> {
        let record = value.as_object().ok_or_else(|| FilesError::Malformed {
            path: String::new(),
            reason: "file record must be an object".to_owned(),
        })?;
        let leaf = UploadLeaf::from_record(record).ok_or_else(|| FilesError::Malformed {
            path: String::new(),
            reason: "missing or ill-typed file attributes".to_owned(),
        })?;
        UploadedFile::from_leaf(&leaf).map_err(FilesError::Upload)
    }

    /// The file name as submitted by the client, e.g. `"image.jpg"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The MIME type as submitted by the client, if any. Client-supplied,
    /// so not to be trusted.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The client-supplied MIME type, falling back to a guess from the file
    /// name's extension.
    pub fn mime_type_or_guess(&self) -> Option<String> {
        match &self.mime_type {
            Some(mime) => Some(mime.clone()),
            None => mime_guess::from_path(&self.name)
                .first()
                .map(|mime| mime.to_string()),
        }
    }

    /// The size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The temporary path where the gateway stored the file.
    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }
}

/// A slot in the upload tree holding one not-yet-validated file. Resolving
/// it validates the error code; existence checks never resolve, so a slot
/// for a failed upload still counts as present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlot {
    leaf: UploadLeaf,
}

impl FileSlot {
    /// The raw attributes backing this slot.
    pub fn leaf(&self) -> &UploadLeaf {
        &self.leaf
    }

    /// Validates the slot into a typed handle, or classifies its upload
    /// error.
    pub fn resolve(&self) -> Result<UploadedFile, UploadError> {
        UploadedFile::from_leaf(&self.leaf)
    }
}

/// The upload tree with every leaf-shaped branch replaced by a [`FileSlot`].
pub type UploadMap = BTreeMap<String, UploadNode>;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadNode {
    /// A group of form fields.
    Branch(UploadMap),
    /// One uploaded file, pending validation.
    File(FileSlot),
    /// A scalar that is not part of any file record.
    Value(Value),
}

/// Converts a reshaped tree, replacing every branch that type-checks as an
/// upload leaf with a file slot and recursing into the rest.
pub(crate) fn build_upload_tree(files: &FileMap) -> UploadMap {
    files
        .iter()
        .map(|(key, node)| (key.clone(), convert(node)))
        .collect()
}

fn convert(node: &FileNode) -> UploadNode {
    match node {
        FileNode::Branch(branch) => match UploadLeaf::from_branch(branch) {
            Some(leaf) => UploadNode::File(FileSlot { leaf }),
            None => UploadNode::Branch(build_upload_tree(branch)),
        },
        FileNode::Value(value) => UploadNode::Value(value.clone()),
    }
}

/// Follows path segments through the tree. Descent stops at file slots and
/// scalars, so paths into a file's attributes resolve to nothing.
pub(crate) fn walk<'a>(tree: &'a UploadMap, path: &[&str]) -> Option<&'a UploadNode> {
    let (first, rest) = path.split_first()?;
    let mut node = tree.get(*first)?;
    for segment in rest {
        match node {
            UploadNode::Branch(map) => node = map.get(*segment)?,
            UploadNode::File(_) | UploadNode::Value(_) => return None,
        }
    }
    Some(node)
}
