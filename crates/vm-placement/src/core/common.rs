//! Common error types.

use thiserror::Error;

/// Errors detected when constructing a policy instance.
/// These are fatal to the instance and are never retried internally.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("utilization threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("host pool is empty")]
    EmptyHostPool,
}

/// Errors produced when resolving a policy from its config string.
#[derive(Debug, Error)]
pub enum PolicyResolveError {
    #[error("unknown allocation policy: {0}")]
    UnknownPolicy(String),
    #[error("invalid policy options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
