
use crate::error::{ErrorOrigin, InternalError};
use bson::{Bson, oid::ObjectId, spec::ElementType};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Key
///
/// Identifier of a referenced document as it appears in a local field.
/// Stores may hold identifiers natively or as their 24-character hex text;
/// both normalize to the same `ObjectId` before they reach a query.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    ObjectId(ObjectId),
    Text(String),
}

impl Key {
    /// Build a key from one BSON scalar.
    pub fn from_bson(value: &Bson) -> Result<Self, KeyError> {
        match value {
            Bson::ObjectId(oid) => Ok(Self::ObjectId(*oid)),
            Bson::String(text) => {
                ObjectId::parse_str(text).map_err(|_| KeyError::InvalidText(text.clone()))?;

                Ok(Self::Text(text.clone()))
            }
            other => Err(KeyError::Unsupported(other.element_type())),
        }
    }

    /// Normalized native identifier.
    pub fn object_id(&self) -> Result<ObjectId, KeyError> {
        match self {
            Self::ObjectId(oid) => Ok(*oid),
            Self::Text(text) => {
                ObjectId::parse_str(text).map_err(|_| KeyError::InvalidText(text.clone()))
            }
        }
    }

    /// Normalized BSON form used in store filters.
    pub fn to_bson(&self) -> Result<Bson, KeyError> {
        self.object_id().map(Bson::ObjectId)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectId(oid) => write!(f, "{oid}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<ObjectId> for Key {
    fn from(oid: ObjectId) -> Self {
        Self::ObjectId(oid)
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl PartialEq<ObjectId> for Key {
    fn eq(&self, other: &ObjectId) -> bool {
        self.object_id().is_ok_and(|oid| oid == *other)
    }
}

///
/// KeyError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum KeyError {
    #[error("unsupported identifier representation: {0:?}")]
    Unsupported(ElementType),

    #[error("'{0}' is not a valid ObjectId")]
    InvalidText(String),
}

impl KeyError {
    pub(crate) fn into_internal(self, origin: ErrorOrigin, path: &str) -> InternalError {
        InternalError::unsupported_key(origin, path, self)
    }
}

/// Normalize a local-field value into a list of keys.
///
/// Arrays contribute one key per element; any other value is a single key.
/// `Null` yields an empty list.
pub fn keys_from_bson(value: &Bson) -> Result<Vec<Key>, KeyError> {
    match value {
        Bson::Null => Ok(Vec::new()),
        Bson::Array(items) => items.iter().map(Key::from_bson).collect(),
        scalar => Key::from_bson(scalar).map(|key| vec![key]),
    }
}

/// Distinct normalized identifiers in first-seen order.
pub fn distinct_object_ids(keys: &[Key]) -> Result<Vec<ObjectId>, KeyError> {
    let mut out: Vec<ObjectId> = Vec::with_capacity(keys.len());
    for key in keys {
        let oid = key.object_id()?;
        if !out.contains(&oid) {
            out.push(oid);
        }
    }

    Ok(out)
}
