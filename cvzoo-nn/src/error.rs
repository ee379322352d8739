use thiserror::Error;

/// The error type for layer construction and shape checks.
#[derive(Error, Debug)]
pub enum NnError {
    /// A configuration value is outside its valid range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The offending configuration field.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A grouped convolution cannot split its channels evenly.
    #[error("Dimension mismatch in {layer}: {channels} channels are not divisible into {groups} groups")]
    ChannelGroupMismatch {
        /// The sub-layer that failed the check.
        layer: String,
        /// Channel count being grouped.
        channels: usize,
        /// Requested group count.
        groups: usize,
    },

    /// An input tensor does not match the layer it is fed to.
    #[error("Dimension mismatch: expected input {expected}, got {actual}")]
    InputShapeMismatch {
        /// The expected shape.
        expected: String,
        /// The actual shape.
        actual: String,
    },
}

/// A specialized `Result` type for layer operations.
pub type NnResult<T> = Result<T, NnError>;
