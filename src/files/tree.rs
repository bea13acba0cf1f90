use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde_json::Value;

use super::FilesError;

/// A reshaped upload tree: form-field path segments map to nested branches,
/// and the per-file attributes sit in the terminal branches as scalars.
pub type FileMap = BTreeMap<String, FileNode>;

/// One node of the reshaped tree. The raw gateway data is "maybe nested,
/// maybe scalar"; here the two cases are an explicit variant.
#[derive(Debug, Clone, PartialEq)]
pub enum FileNode {
    Branch(FileMap),
    Value(Value),
}

impl FileNode {
    pub fn as_branch(&self) -> Option<&FileMap> {
        match self {
            FileNode::Branch(map) => Some(map),
            FileNode::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FileNode::Branch(_) => None,
            FileNode::Value(value) => Some(value),
        }
    }
}

/// Transposes the raw upload structure (field → attribute → hierarchy) into
/// a tree keyed by field path (field → hierarchy → attribute).
///
/// For every field group, a nested attribute value has each of its scalar
/// leaves `v` rewritten to `{attribute: v}` and is then deep-merged into the
/// group's accumulator; a scalar attribute value (a non-nested single-file
/// field) is assigned directly under the group. The deep merge is a
/// recursive union of branches; merging a branch with a scalar at the same
/// path means the attributes disagree about the field hierarchy and is
/// reported as [`FilesError::ShapeMismatch`] instead of silently picking a
/// side.
pub fn reorder(raw: &Value) -> Result<FileMap, FilesError> {
    let Some(fields) = raw.as_object() else {
        return Err(FilesError::Malformed {
            path: String::new(),
            reason: "upload structure must be an object".to_owned(),
        });
    };
    let mut ret = FileMap::new();
    for (field, attrs) in fields {
        let Some(attrs) = attrs.as_object() else {
            return Err(FilesError::Malformed {
                path: field.clone(),
                reason: "field must map attribute names to values".to_owned(),
            });
        };
        let mut group = FileMap::new();
        for (attr, node) in attrs {
            if let Some(nested) = node.as_object() {
                let converted = push_attr_to_leaves(nested, attr, field)?;
                merge(&mut group, converted, field)?;
            } else {
                let path = format!("{field}.{attr}");
                let single = FileMap::from([(attr.clone(), FileNode::Value(scalar(node, &path)?))]);
                merge(&mut group, single, field)?;
            }
        }
        ret.insert(field.clone(), FileNode::Branch(group));
    }
    Ok(ret)
}

/// Converts one attribute's hierarchy mirror, rewriting every scalar leaf
/// `v` into a singleton branch `{attr: v}`.
fn push_attr_to_leaves(
    map: &serde_json::Map<String, Value>,
    attr: &str,
    path: &str,
) -> Result<FileMap, FilesError> {
    let mut ret = FileMap::new();
    for (key, child) in map {
        let child_path = format!("{path}.{key}");
        let node = match child.as_object() {
            Some(nested) => FileNode::Branch(push_attr_to_leaves(nested, attr, &child_path)?),
            None => FileNode::Branch(FileMap::from([(
                attr.to_owned(),
                FileNode::Value(scalar(child, &child_path)?),
            )])),
        };
        ret.insert(key.clone(), node);
    }
    Ok(ret)
}

/// Recursive union of two branches.
fn merge(dst: &mut FileMap, src: FileMap, path: &str) -> Result<(), FilesError> {
    for (key, node) in src {
        match dst.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(node);
            }
            Entry::Occupied(mut entry) => {
                let child_path = format!("{path}.{}", entry.key());
                match (entry.get_mut(), node) {
                    (FileNode::Branch(dst_branch), FileNode::Branch(src_branch)) => {
                        merge(dst_branch, src_branch, &child_path)?;
                    }
                    _ => return Err(FilesError::ShapeMismatch { path: child_path }),
                }
            }
        }
    }
    Ok(())
}

/// Attribute leaves are strings, numbers or booleans; arrays and nulls have
/// no meaning in the gateway structure.
fn scalar(value: &Value, path: &str) -> Result<Value, FilesError> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
        _ => Err(FilesError::Malformed {
            path: path.to_owned(),
            reason: format!("attribute leaf must be a scalar, got {value}"),
        }),
    }
}
