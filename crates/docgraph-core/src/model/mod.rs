//! Runtime schema model.
//!
//! Every entity and embedded type exposes one static [`TypeModel`]: its
//! serialized fields in declaration order, each tagged as plain, embed, or
//! reference. The derive macros emit these as `static` items; hand-built
//! models are plain struct literals. Nothing here performs I/O.
//!
//! In general:
//! - derive attributes declare *what links where*
//! - `model` is what the engines walk

pub mod entity;
pub mod field;
mod validate;


pub use entity::{EntityModel, EntityModelFn, TypeModel, TypeModelFn};
pub use field::{Cardinality, FieldKind, FieldModel, ReferenceModel};
pub use validate::{validate_entity_model, validate_type_model};
