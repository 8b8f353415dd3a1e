use derive_more::Display;
use docgraph_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{origin}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// What went wrong, from the caller's point of view.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// A schema or repository setting is malformed; fix the declaration.
    Configuration,

    /// An identifier could not be turned into a store key.
    UnsupportedKey,

    /// A scalar reference matched more than one document.
    AmbiguousReference,

    /// The document store failed; the message carries its error.
    Store,

    Serialize,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Configuration => Self::Configuration,
            ErrorClass::UnsupportedKey => Self::UnsupportedKey,
            ErrorClass::AmbiguousReference => Self::AmbiguousReference,
            ErrorClass::Store => Self::Store,
            ErrorClass::Serialize => Self::Serialize,
            ErrorClass::InvariantViolation => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Model,
    Populate,
    Depopulate,
    Pipeline,
    Repository,
    Store,
    Serialize,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Model => Self::Model,
            CoreErrorOrigin::Populate => Self::Populate,
            CoreErrorOrigin::Depopulate => Self::Depopulate,
            CoreErrorOrigin::Pipeline => Self::Pipeline,
            CoreErrorOrigin::Repository => Self::Repository,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Serialize => Self::Serialize,
        }
    }
}
