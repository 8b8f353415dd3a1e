//! Graph resolution over a document store.
//!
//! The engines (`populate`, `depopulate`, `pipeline`) walk static models and
//! BSON documents; `hydrate` picks between the client-side and server-side
//! strategies; `repository` binds one entity type to one collection.

pub mod depopulate;
pub mod hydrate;
pub mod pipeline;
pub mod populate;
pub mod repository;
pub mod store;
