//! ## Crate layout
//! - `core`: static models, keys, paths, and the populate / depopulate /
//!   pipeline engines.
//! - `derive`: `#[derive(Entity)]` and `#[derive(Embedded)]`.
//! - `error`: the public error type.
//!
//! Entities declare their edges with derive attributes; a [`Repository`]
//! binds one entity to one collection of a [`DocumentStore`] and resolves
//! references on read and strips them on write.
//!
//! ```ignore
//! use docgraph::prelude::*;
//!
//! #[derive(Deserialize, Entity, Serialize)]
//! struct User {
//!     #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
//!     id: Option<ObjectId>,
//!     name: String,
//!
//!     #[docgraph(reference(local = "order_refs"))]
//!     #[serde(default, skip_serializing_if = "Option::is_none")]
//!     orders: Option<Vec<Order>>,
//!     #[serde(default)]
//!     order_refs: Vec<ObjectId>,
//! }
//! ```

pub use docgraph_core as core;
pub use docgraph_derive as derive;

pub mod error;

// derive output names `::docgraph::model` and `::docgraph::traits`
pub use docgraph_core::{db, document, key, model, overrides, path, serialize, traits};

pub use bson;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Exports
//

pub use db::{
    hydrate::Strategy,
    populate::ScalarMatch,
    repository::{Repository, RepositoryConfig},
    store::{DocumentStore, MemoryStore},
};
pub use docgraph_derive::{Embedded, Entity};
pub use error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Embedded, Entity, Repository, RepositoryConfig, ScalarMatch, Strategy,
        core::prelude::*,
        db::store::{DocumentStore as _, MemoryStore},
    };
    pub use bson::{Document, doc, oid::ObjectId};
    pub use serde::{Deserialize, Serialize};
}
