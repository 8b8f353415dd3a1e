mod eval;
mod memory;

pub use memory::MemoryStore;

use crate::db::pipeline::Stage;
use bson::{Bson, Document};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures raised by a document store. Engines never retry; the error
/// reaches the caller unchanged inside `ErrorDetail::Store`.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("duplicate key {key} in collection '{collection}'")]
    DuplicateKey { collection: String, key: String },

    #[error("unsupported filter operator '{0}'")]
    UnsupportedOperator(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

///
/// DocumentStore
///
/// The collection handle the engines consume. Every method is one round
/// trip; implementations decide about timeouts and cancellation.
///

pub trait DocumentStore {
    /// Documents of `collection` matching an equality / `$in` filter, in store order.
    fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>, StoreError>;

    /// Documents whose `field` equals any of `keys`, each returned once.
    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        keys: &[Bson],
    ) -> Result<Vec<Document>, StoreError>;

    /// Run `stages` over the documents matching `filter`.
    fn aggregate(
        &self,
        collection: &str,
        filter: &Document,
        stages: &[Stage],
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert one document and return its identifier.
    fn insert_one(&self, collection: &str, doc: Document) -> Result<Bson, StoreError>;

    /// Replace the document with identifier `id`; `false` when none matched.
    fn replace_one(&self, collection: &str, id: &Bson, doc: Document) -> Result<bool, StoreError>;
}

macro_rules! impl_document_store_for_pointer {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<T: DocumentStore + ?Sized> DocumentStore for $ptr {
                fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>, StoreError> {
                    (**self).find(collection, filter)
                }

                fn find_by_field(
                    &self,
                    collection: &str,
                    field: &str,
                    keys: &[Bson],
                ) -> Result<Vec<Document>, StoreError> {
                    (**self).find_by_field(collection, field, keys)
                }

                fn aggregate(
                    &self,
                    collection: &str,
                    filter: &Document,
                    stages: &[Stage],
                ) -> Result<Vec<Document>, StoreError> {
                    (**self).aggregate(collection, filter, stages)
                }

                fn insert_one(&self, collection: &str, doc: Document) -> Result<Bson, StoreError> {
                    (**self).insert_one(collection, doc)
                }

                fn replace_one(&self, collection: &str, id: &Bson, doc: Document) -> Result<bool, StoreError> {
                    (**self).replace_one(collection, id, doc)
                }
            }
        )*
    };
}

impl_document_store_for_pointer!(&T, Arc<T>);

///
/// StoreOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreOp {
    Find,
    FindByField,
    Aggregate,
    InsertOne,
    ReplaceOne,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Find => "find",
            Self::FindByField => "find_by_field",
            Self::Aggregate => "aggregate",
            Self::InsertOne => "insert_one",
            Self::ReplaceOne => "replace_one",
        };
        write!(f, "{label}")
    }
}

///
/// StoreCall
/// One journaled round trip.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub collection: String,
}
