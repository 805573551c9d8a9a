//! Error types used by the crate.

use meridian_types::MeridianTypesError;
use thiserror::Error;

/// Meridian error type.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Datasource failed to produce features.
    #[error("datasource error: {0}")]
    Datasource(#[from] DatasourceError),
    /// No constructor is registered for the datasource type.
    #[error("unknown datasource type: {0}")]
    UnknownDatasourceType(String),
    /// Filter expression could not be parsed.
    #[error("invalid expression: {0}")]
    Expression(#[from] ExpressionError),
    /// Reference system or projection error.
    #[error("projection error: {0}")]
    Projection(#[from] MeridianTypesError),
    /// Failed to start the retrieval worker pool.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] std::io::Error),
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Error returned by a [`Datasource`](crate::datasource::Datasource) when features cannot be read.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasourceError {
    /// Connection to the underlying storage failed.
    #[error("failed to connect: {0}")]
    Connection(String),
    /// Data was read, but is malformed.
    #[error("failed to decode data: {0}")]
    Decoding(String),
    /// Required parameter is missing or has invalid value.
    #[error("invalid parameter '{0}'")]
    InvalidParameter(String),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

/// Error parsing a filter expression.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message} at position {position}")]
pub struct ExpressionError {
    /// Description of the problem.
    pub message: String,
    /// Byte offset in the source text.
    pub position: usize,
}

impl ExpressionError {
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}
