use backbones::SENetError;
use thiserror::Error;

/// The error type for cvzoo operations.
#[derive(Error, Debug)]
pub enum ZooError {
    /// The requested model name is not registered.
    #[error("Unknown model: {name}. Available models: {available}")]
    UnknownModel {
        /// The name that was looked up.
        name: String,
        /// Comma separated list of registered names.
        available: String,
    },

    /// Logically inconsistent settings.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// An input tensor has an unexpected shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Building a backbone failed.
    #[error("Model construction failed: {0}")]
    Backbone(#[from] SENetError),
}

/// A specialized `Result` type for cvzoo operations.
pub type ZooResult<T> = Result<T, ZooError>;
