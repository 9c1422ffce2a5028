//! Error types for CRS resolution and queries.
//!
//! Hard failures (malformed input, failed resolution, engine faults) are
//! errors. Soft outcomes such as a missing property or an out-of-range index
//! are not errors at all: they are sentinel values produced by the query
//! layer (see [`crate::cells`]).

use crate::engine::EngineError;

/// Result type for CRS operations
pub type CrsResult<T> = Result<T, CrsError>;

/// Coarse classification of a [`CrsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input did not match any accepted CRS shape
    MalformedSpec,
    /// The engine could not build a CRS from well-formed input
    ResolutionFailed,
    /// A point or optional argument could not be read
    InvalidInput,
    /// The engine failed while reading or computing
    Engine,
    /// Settings or key/value store failure
    Configuration,
}

/// Error type for CRS operations
#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    /// Wrong block shape, wrong cell types, or unparsable integer text.
    #[error("Malformed CRS specification: {0}")]
    MalformedSpec(String),

    /// Well-formed input the engine could not turn into a CRS.
    #[error("CRS resolution failed: {0}")]
    ResolutionFailed(String),

    /// A point argument was not a single row of 2 to 4 numbers.
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// An optional or auxiliary argument could not be coerced.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine failure after a CRS was resolved.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Settings file or key/value store failure.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrsError {
    /// Create a malformed specification error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSpec(message.into())
    }

    /// Create a resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::ResolutionFailed(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Coarse error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrsError::MalformedSpec(_) => ErrorKind::MalformedSpec,
            CrsError::ResolutionFailed(_) => ErrorKind::ResolutionFailed,
            CrsError::InvalidPoint(_) | CrsError::InvalidArgument(_) => ErrorKind::InvalidInput,
            CrsError::Engine(_) => ErrorKind::Engine,
            CrsError::Config(_) => ErrorKind::Configuration,
        }
    }
}

impl From<std::io::Error> for CrsError {
    fn from(err: std::io::Error) -> Self {
        CrsError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(CrsError::malformed("x").kind(), ErrorKind::MalformedSpec);
        assert_eq!(CrsError::resolution("x").kind(), ErrorKind::ResolutionFailed);
        assert_eq!(
            CrsError::InvalidPoint("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            CrsError::from(EngineError::Operation("boom".into())).kind(),
            ErrorKind::Engine
        );
    }

    #[test]
    fn test_error_display() {
        let err = CrsError::resolution("unknown code EPSG:99999");
        assert_eq!(
            err.to_string(),
            "CRS resolution failed: unknown code EPSG:99999"
        );
    }
}
