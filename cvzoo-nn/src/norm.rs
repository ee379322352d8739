//! Optional normalization after a convolution.

use burn::{
    nn::{BatchNorm, BatchNormConfig},
    prelude::*,
};

use std::marker::PhantomData;

/// Which normalization layer follows a convolution.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum NormKind {
    /// `BatchNorm` over the channel axis.
    BatchNorm,
    /// No normalization.
    None,
}

/// Parameter-free stand-in for a disabled normalization layer.
#[derive(Module, Debug)]
pub struct NoNorm<B: Backend> {
    _b: PhantomData<B>,
}

impl<B: Backend> NoNorm<B> {
    pub const fn new() -> Self {
        Self { _b: PhantomData }
    }

    pub const fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        x
    }
}

impl<B: Backend> Default for NoNorm<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalization layer selected by [`NormKind`].
#[derive(Module, Debug)]
pub enum NormLayer<B: Backend> {
    BatchNorm(BatchNorm<B, 2>),
    Disabled(NoNorm<B>),
}

impl<B: Backend> NormLayer<B> {
    /// Creates the layer for `channels` feature maps.
    pub fn new(
        kind: &NormKind,
        channels: usize,
        epsilon: f64,
        momentum: f64,
        device: &Device<B>,
    ) -> Self {
        match kind {
            NormKind::BatchNorm => Self::BatchNorm(
                BatchNormConfig::new(channels)
                    .with_epsilon(epsilon)
                    .with_momentum(momentum)
                    .init(device),
            ),
            NormKind::None => Self::Disabled(NoNorm::new()),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::BatchNorm(bn) => bn.forward(x),
            Self::Disabled(layer) => layer.forward(x),
        }
    }

    /// Whether a real normalization layer is present.
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::BatchNorm(_))
    }
}
