//! Layers shared by the cvzoo model zoo.
//!
//! Burn supplies convolution, normalization and activation primitives; this crate
//! composes them into the attention blocks used by the zoo architectures.

mod error;
mod norm;
mod splat;
mod squeeze_excite;

pub use error::{NnError, NnResult};
pub use norm::{NoNorm, NormKind, NormLayer};
pub use splat::{inter_channels, SplitAttentionConv, SplitAttentionConvConfig, MIN_INTER_CHANNELS};
pub use squeeze_excite::{SqueezeExcite, SqueezeExciteConfig};

/// Checks that a convolution with `groups` groups can split `channels` evenly.
pub(crate) fn check_groups(layer: &str, channels: usize, groups: usize) -> NnResult<()> {
    if groups == 0 || channels % groups != 0 {
        return Err(NnError::ChannelGroupMismatch {
            layer: layer.to_string(),
            channels,
            groups,
        });
    }
    Ok(())
}
