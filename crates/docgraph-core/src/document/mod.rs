//! Dotted-path access into BSON documents.
//!
//! Paths are relative to the document passed in. A missing leaf is simply
//! absent; a segment that cannot be walked through (a scalar or array where a
//! sub-document is required) is reported as [`MissingField`], which callers
//! log and treat as absent.


use bson::{Bson, Document};
use thiserror::Error as ThisError;

///
/// MissingField
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot resolve segment '{segment}' of path '{path}'")]
pub struct MissingField {
    pub path: String,
    pub segment: String,
}

impl MissingField {
    fn new(path: &str, segment: &str) -> Self {
        Self {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }
}

/// Borrow the value at `path`; `Ok(None)` when the leaf or a parent is absent or null.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Result<Option<&'a Bson>, MissingField> {
    let (parents, leaf) = split(path);

    let mut current = doc;
    for segment in parents {
        match current.get(segment) {
            None | Some(Bson::Null) => return Ok(None),
            Some(Bson::Document(inner)) => current = inner,
            Some(_) => return Err(MissingField::new(path, segment)),
        }
    }

    Ok(current.get(leaf))
}

/// Owned, non-null value at `path`.
pub fn get_present(doc: &Document, path: &str) -> Result<Option<Bson>, MissingField> {
    Ok(get_path(doc, path)?
        .filter(|value| !matches!(value, Bson::Null))
        .cloned())
}

/// Write `value` at `path`, creating intermediate documents as needed.
pub fn set_path(doc: &mut Document, path: &str, value: Bson) -> Result<(), MissingField> {
    let (parents, leaf) = split(path);

    let mut current = doc;
    for segment in parents {
        if matches!(current.get(segment), None | Some(Bson::Null)) {
            current.insert(segment, Document::new());
        }
        match current.get_mut(segment) {
            Some(Bson::Document(inner)) => current = inner,
            _ => return Err(MissingField::new(path, segment)),
        }
    }

    current.insert(leaf, value);

    Ok(())
}

/// Remove and return the value at `path`.
pub fn remove_path(doc: &mut Document, path: &str) -> Result<Option<Bson>, MissingField> {
    let (parents, leaf) = split(path);

    let mut current = doc;
    for segment in parents {
        match current.get_mut(segment) {
            None | Some(Bson::Null) => return Ok(None),
            Some(Bson::Document(inner)) => current = inner,
            Some(_) => return Err(MissingField::new(path, segment)),
        }
    }

    Ok(current.remove(leaf))
}

/// True when the value is absent or BSON null.
#[must_use]
pub const fn is_null(value: Option<&Bson>) -> bool {
    matches!(value, None | Some(Bson::Null))
}

fn split(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().unwrap_or_default();

    (segments, leaf)
}
