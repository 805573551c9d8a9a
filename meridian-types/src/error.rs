//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeridianTypesError {
    /// The reference system definition could not be recognized.
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),
    /// The reference system is known, but there is no projection implementation for it.
    #[error("no projection available for {0}")]
    ProjectionUnavailable(String),
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
}
