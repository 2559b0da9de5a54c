//! Error types shared by every driver.

use thiserror::Error;

/// Boxed underlying cause of a [`SourceError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while talking to a relational source.
///
/// Each variant is fatal for the call that produced it. Drivers never retry
/// internally and never return partial results alongside an error.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A usable connection could not be established or torn down.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// The metadata catalog could not be queried or decoded.
    #[error("Introspection error: {0}")]
    Introspection(#[source] BoxError),

    /// A scan could not be prepared, executed or read.
    #[error("Query error: {0}")]
    Query(#[source] BoxError),
}

/// Discriminant of a [`SourceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Introspection,
    Query,
}

impl SourceError {
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Self::Connection(err.into())
    }

    pub fn introspection(err: impl Into<BoxError>) -> Self {
        Self::Introspection(err.into())
    }

    pub fn query(err: impl Into<BoxError>) -> Self {
        Self::Query(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::Introspection(_) => ErrorKind::Introspection,
            Self::Query(_) => ErrorKind::Query,
        }
    }
}
