//! Squeeze-and-excitation channel gating.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        Relu,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::{NnError, NnResult};

/// Configuration for [`SqueezeExcite`].
#[derive(Config, Debug)]
pub struct SqueezeExciteConfig {
    /// Number of gated channels.
    pub channels: usize,
    /// The squeezed width is `channels / reduction`.
    #[config(default = 16)]
    pub reduction: usize,
    #[config(default = false)]
    pub bias: bool,
}

impl SqueezeExciteConfig {
    /// Initializes a new [`SqueezeExcite`] block.
    ///
    /// # Errors
    ///
    /// Returns [`NnError::InvalidParameter`] if the squeezed width would be zero.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> NnResult<SqueezeExcite<B>> {
        if self.reduction == 0 || self.channels / self.reduction == 0 {
            return Err(NnError::InvalidParameter {
                name: "reduction".to_string(),
                reason: format!(
                    "{} channels cannot be squeezed by a factor of {}",
                    self.channels, self.reduction
                ),
            });
        }
        let squeezed = self.channels / self.reduction;

        Ok(SqueezeExcite {
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            reduce: Conv2dConfig::new([self.channels, squeezed], [1, 1])
                .with_bias(self.bias)
                .init(device),
            relu: Relu::new(),
            expand: Conv2dConfig::new([squeezed, self.channels], [1, 1])
                .with_bias(self.bias)
                .init(device),
        })
    }
}

/// Global-average-pool, bottleneck, sigmoid gate, broadcast multiply.
#[derive(Module, Debug)]
pub struct SqueezeExcite<B: Backend> {
    pool: AdaptiveAvgPool2d,
    reduce: Conv2d<B>,
    relu: Relu,
    expand: Conv2d<B>,
}

impl<B: Backend> SqueezeExcite<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let gate = self.gate(x.clone());
        x * gate
    }

    /// Per-channel gate in `(0, 1)`, shaped `[batch_size, channels, 1, 1]`.
    pub fn gate(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let w = self.pool.forward(x);
        let w = self.reduce.forward(w);
        let w = self.relu.forward(w);
        sigmoid(self.expand.forward(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn gate_is_bounded_and_broadcast() {
        let device = Default::default();
        let se = SqueezeExciteConfig::new(64).init::<TestBackend>(&device).unwrap();
        let input = Tensor::<TestBackend, 4>::random(
            [2, 64, 7, 7],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let gate = se.gate(input.clone());
        assert_eq!(gate.dims(), [2, 64, 1, 1]);
        for value in gate.into_data().iter::<f32>() {
            assert!(value > 0.0 && value < 1.0);
        }
        assert_eq!(se.forward(input).dims(), [2, 64, 7, 7]);
    }

    #[test]
    fn too_few_channels_rejected() {
        let device = Default::default();
        let result = SqueezeExciteConfig::new(8).init::<TestBackend>(&device);
        assert!(matches!(result, Err(NnError::InvalidParameter { .. })));
    }
}
