use crate::{
    db::{hydrate::Strategy, populate::ScalarMatch},
    error::InternalError,
    overrides::Overrides,
};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read repository config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse repository config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::repository_configuration(err.to_string())
    }
}

///
/// RepositoryConfig
///
/// Per-repository settings. Every key is optional:
///
/// ```toml
/// collection = "people"
/// strategy = "pipeline"
/// populate = true
/// backfill_references = false
/// scalar_match = "unique"
///
/// [overrides]
/// "orders.products" = false
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Collection name; defaults to the entity's declared collection.
    pub collection: Option<String>,
    pub strategy: Strategy,
    /// When off, reads return stored documents and writes skip depopulation.
    pub populate: bool,
    /// Write hydrated identifiers back into local fields on depopulate.
    pub backfill_references: bool,
    pub scalar_match: ScalarMatch,
    /// Initial override table.
    pub overrides: Overrides,
}

impl RepositoryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;

        Self::from_toml_str(&source)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            collection: None,
            strategy: Strategy::default(),
            populate: true,
            backfill_references: false,
            scalar_match: ScalarMatch::default(),
            overrides: Overrides::default(),
        }
    }
}
