use crate::error::InternalError;
use bson::Document;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(#[from] bson::ser::Error),

    #[error("deserialize error: {0}")]
    Deserialize(#[from] bson::de::Error),
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::serialize(err.to_string())
    }
}

/// Serialize a typed value into a BSON document.
pub fn to_document<T>(value: &T) -> Result<Document, SerializeError>
where
    T: Serialize + ?Sized,
{
    Ok(bson::to_document(value)?)
}

/// Decode a BSON document into a typed value.
pub fn from_document<T>(doc: Document) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    Ok(bson::from_document(doc)?)
}
