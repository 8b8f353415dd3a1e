use std::fmt;

///
/// FieldPath
///
/// Dot-joined field names from the entity root. The root path is empty;
/// `level` counts the dots, so a top-level field sits at level 0.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FieldPath(String);

impl FieldPath {
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a field declared on the type at this position.
    #[must_use]
    pub fn join(&self, field: &str) -> Self {
        if self.is_root() {
            Self(field.to_string())
        } else {
            Self(format!("{}.{field}", self.0))
        }
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.0.matches('.').count()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
