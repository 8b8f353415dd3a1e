// -----------------------------------------------------------------------------
// Standard re-exports for `traits::X` ergonomics
// -----------------------------------------------------------------------------

pub use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::model::{EntityModel, TypeModel};

// ============================================================================
// SCHEMA
// ============================================================================
//
// These traits expose the static model of a type. Both are normally
// implemented by `#[derive(Entity)]` / `#[derive(Embedded)]`.
//

///
/// TypeSchema
/// Any type with a declared field model (entities and embedded values).
///

pub trait TypeSchema {
    fn model() -> &'static TypeModel;
}

///
/// EntitySchema
///
/// A collection root. `COLLECTION` is the default collection name;
/// repositories may override it.
///

pub trait EntitySchema: TypeSchema {
    const COLLECTION: &'static str;

    fn entity_model() -> &'static EntityModel;
}

// ============================================================================
// ALIASES
// ============================================================================

///
/// EntityKind
/// Everything a repository needs from its entity type.
///

pub trait EntityKind: EntitySchema + Serialize + DeserializeOwned {}

impl<T> EntityKind for T where T: EntitySchema + Serialize + DeserializeOwned {}
