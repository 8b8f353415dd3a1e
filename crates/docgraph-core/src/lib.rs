//! Core runtime for docgraph: static schema models, keys and paths, the
//! populate / depopulate / pipeline engines, stores, and repositories.

extern crate self as docgraph;

// public exports are one module level down
pub mod db;
pub mod document;
pub mod error;
pub mod key;
pub mod model;
pub mod overrides;
pub mod path;
pub mod serialize;
pub mod traits;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Serialized name of the entity identifier field.
pub const PRIMARY_KEY: &str = "_id";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, engines, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        key::Key,
        model::{EntityModel, TypeModel},
        overrides::Overrides,
        path::FieldPath,
        traits::{EntityKind, EntitySchema, TypeSchema},
    };
}
