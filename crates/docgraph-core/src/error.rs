use crate::{db::store::StoreError, key::KeyError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; the facade crate maps it into its public error.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a model-origin configuration error for one type path.
    pub(crate) fn configuration(type_path: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Configuration,
            ErrorOrigin::Model,
            format!("invalid schema for '{type_path}': {}", message.into()),
        )
    }

    /// Construct a repository-origin configuration error.
    pub(crate) fn repository_configuration(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Configuration,
            ErrorOrigin::Repository,
            message.into(),
        )
    }

    /// Wrap a key conversion failure raised while resolving `path`.
    pub(crate) fn unsupported_key(origin: ErrorOrigin, path: &str, err: KeyError) -> Self {
        Self::new(
            ErrorClass::UnsupportedKey,
            origin,
            format!("reference '{path}': {err}"),
        )
    }

    /// Construct a populate-origin ambiguity error for a scalar reference.
    pub(crate) fn ambiguous_reference(path: &str, collection: &str, matches: usize) -> Self {
        Self::new(
            ErrorClass::AmbiguousReference,
            ErrorOrigin::Populate,
            format!(
                "scalar reference '{path}' matched {matches} documents in '{collection}', expected at most one"
            ),
        )
    }

    /// Construct a serialize-origin error.
    pub(crate) fn serialize(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Serialize, ErrorOrigin::Serialize, message.into())
    }

    /// Construct an invariant violation for a specific origin.
    pub(crate) fn invariant(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, origin, message.into())
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_unsupported_key(&self) -> bool {
        matches!(self.class, ErrorClass::UnsupportedKey)
    }

    /// Borrow the collaborator error when this error came from the store.
    #[must_use]
    pub const fn store_error(&self) -> Option<&StoreError> {
        match &self.detail {
            Some(ErrorDetail::Store(err)) => Some(err),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self {
            class: ErrorClass::Store,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Store(StoreError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    UnsupportedKey,
    AmbiguousReference,
    Store,
    Serialize,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::UnsupportedKey => "unsupported_key",
            Self::AmbiguousReference => "ambiguous_reference",
            Self::Store => "store",
            Self::Serialize => "serialize",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Model,
    Populate,
    Depopulate,
    Pipeline,
    Repository,
    Store,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Model => "model",
            Self::Populate => "populate",
            Self::Depopulate => "depopulate",
            Self::Pipeline => "pipeline",
            Self::Repository => "repository",
            Self::Store => "store",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}
