use crate::{model::ReferenceModel, path::FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Overrides
///
/// Path-addressed enable flags for reference edges. An entry takes
/// precedence over the edge's static default for every engine call that
/// receives this table, until it is reset.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<String, bool>);

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, enabled: bool) -> &mut Self {
        self.0.insert(path.into(), enabled);
        self
    }

    pub fn enable<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.set(path, true);
        }
        self
    }

    pub fn disable<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.set(path, false);
        }
        self
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<bool> {
        self.0.get(path).copied()
    }

    /// Effective enabled flag of a reference edge at `path`.
    #[must_use]
    pub fn resolve(&self, path: &FieldPath, reference: &ReferenceModel) -> bool {
        self.get(path.as_str()).unwrap_or(reference.auto_populate)
    }

    pub fn reset(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(path, enabled)| (path.as_str(), *enabled))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(path, enabled)| (path.into(), enabled))
                .collect(),
        )
    }
}
