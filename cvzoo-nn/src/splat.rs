//! Split-attention convolution.
//!
//! A single grouped convolution computes `radix` candidate feature maps at once.
//! A squeeze-excite style bottleneck then scores every split per channel, and the
//! splits are recombined as an attention-weighted sum. With `radix == 1` the block
//! reduces to plain squeeze-and-excitation gating of the convolution output.
//!
//! # Shapes
//!   - input: `[batch_size, in_channels, height, width]`
//!   - output: `[batch_size, channels, height_out, width_out]`, where the spatial
//!     size follows the usual convolution arithmetic for the configured kernel,
//!     stride, padding and dilation.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        Dropout, DropoutConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::activation::{sigmoid, softmax},
};

use crate::{check_groups, NnError, NnResult, NormKind, NormLayer};

/// Lower bound on the width of the attention bottleneck.
pub const MIN_INTER_CHANNELS: usize = 32;

/// Width of the attention bottleneck: `max(in_channels * radix / 2 / r, 32)`.
///
/// Divisions are integer divisions applied left to right.
pub const fn inter_channels(in_channels: usize, radix: usize, reduction_factor: usize) -> usize {
    let reduced = in_channels * radix / 2 / reduction_factor;
    if reduced > MIN_INTER_CHANNELS {
        reduced
    } else {
        MIN_INTER_CHANNELS
    }
}

/// Configuration for [`SplitAttentionConv`].
#[derive(Config, Debug)]
pub struct SplitAttentionConvConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels.
    pub channels: usize,
    /// Kernel size of the main convolution.
    pub kernel_size: [usize; 2],
    #[config(default = "[1, 1]")]
    pub stride: [usize; 2],
    #[config(default = "[0, 0]")]
    pub padding: [usize; 2],
    #[config(default = "[1, 1]")]
    pub dilation: [usize; 2],
    /// Cardinality: group count of the bottleneck convolutions.
    /// The main convolution uses `groups * radix` groups.
    #[config(default = 1)]
    pub groups: usize,
    /// Number of parallel splits.
    #[config(default = 2)]
    pub radix: usize,
    /// Reduction factor `r` of the attention bottleneck.
    #[config(default = 2)]
    pub reduction_factor: usize,
    #[config(default = "NormKind::BatchNorm")]
    pub norm: NormKind,
    #[config(default = 1e-5)]
    pub norm_epsilon: f64,
    #[config(default = 0.1)]
    pub norm_momentum: f64,
    /// Dropout applied inside the attention bottleneck. Disabled when zero.
    #[config(default = 0.0)]
    pub drop_ratio: f64,
    #[config(default = true)]
    pub bias: bool,
}

impl SplitAttentionConvConfig {
    fn validate(&self) -> NnResult<()> {
        for (name, value) in [
            ("in_channels", self.in_channels),
            ("channels", self.channels),
            ("groups", self.groups),
            ("radix", self.radix),
            ("reduction_factor", self.reduction_factor),
        ] {
            if value == 0 {
                return Err(NnError::InvalidParameter {
                    name: name.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if !(0.0..1.0).contains(&self.drop_ratio) {
            return Err(NnError::InvalidParameter {
                name: "drop_ratio".to_string(),
                reason: format!("must be in [0, 1), got {}", self.drop_ratio),
            });
        }

        let split_groups = self.groups * self.radix;
        let inter = inter_channels(self.in_channels, self.radix, self.reduction_factor);

        check_groups("conv input", self.in_channels, split_groups)?;
        check_groups("conv output", self.channels * self.radix, split_groups)?;
        check_groups("fc1 input", self.channels, self.groups)?;
        check_groups("fc1 output", inter, self.groups)?;
        check_groups("fc2 output", self.channels * self.radix, self.groups)
    }

    /// Initializes a new [`SplitAttentionConv`].
    ///
    /// # Errors
    ///
    /// Returns [`NnError::ChannelGroupMismatch`] when a grouped convolution cannot split
    /// its channels, and [`NnError::InvalidParameter`] for zero widths or an out of
    /// range dropout ratio.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> NnResult<SplitAttentionConv<B>> {
        self.validate()?;

        let split_channels = self.channels * self.radix;
        let inter = inter_channels(self.in_channels, self.radix, self.reduction_factor);

        let conv = Conv2dConfig::new([self.in_channels, split_channels], self.kernel_size)
            .with_stride(self.stride)
            .with_padding(PaddingConfig2d::Explicit(self.padding[0], self.padding[1]))
            .with_dilation(self.dilation)
            .with_groups(self.groups * self.radix)
            .with_bias(self.bias)
            .init(device);
        let bn = NormLayer::new(
            &self.norm,
            split_channels,
            self.norm_epsilon,
            self.norm_momentum,
            device,
        );

        let fc1 = Conv2dConfig::new([self.channels, inter], [1, 1])
            .with_groups(self.groups)
            .init(device);
        let bn1 = NormLayer::new(
            &self.norm,
            inter,
            self.norm_epsilon,
            self.norm_momentum,
            device,
        );
        let drop = (self.drop_ratio > 0.0).then(|| DropoutConfig::new(self.drop_ratio).init());
        let fc2 = Conv2dConfig::new([inter, split_channels], [1, 1])
            .with_groups(self.groups)
            .init(device);

        Ok(SplitAttentionConv {
            conv,
            bn,
            relu: Relu::new(),
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc1,
            bn1,
            drop,
            fc2,
            in_channels: self.in_channels,
            channels: self.channels,
            cardinality: self.groups,
            radix: self.radix,
        })
    }
}

/// Split-attention convolution block.
#[derive(Module, Debug)]
pub struct SplitAttentionConv<B: Backend> {
    conv: Conv2d<B>,
    bn: NormLayer<B>,
    relu: Relu,
    pool: AdaptiveAvgPool2d,
    fc1: Conv2d<B>,
    bn1: NormLayer<B>,
    drop: Option<Dropout>,
    fc2: Conv2d<B>,
    in_channels: usize,
    channels: usize,
    cardinality: usize,
    radix: usize,
}

impl<B: Backend> SplitAttentionConv<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.split_features(x);
        let [batch, _, height, width] = x.dims();

        if self.radix > 1 {
            let splits = x.reshape([batch, self.radix, self.channels, height, width]);
            let gap = splits.clone().sum_dim(1).squeeze::<4>(1);
            let atten = self
                .attention_from_descriptor(gap)
                .reshape([batch, self.radix, self.channels, 1, 1]);
            (splits * atten).sum_dim(1).squeeze::<4>(1)
        } else {
            let gate = self
                .attention_from_descriptor(x.clone())
                .reshape([batch, self.channels, 1, 1]);
            x * gate
        }
    }

    /// Like [`forward`](Self::forward), but rejects inputs whose channel count does
    /// not match the configured `in_channels`.
    pub fn try_forward(&self, x: Tensor<B, 4>) -> NnResult<Tensor<B, 4>> {
        self.check_input(&x)?;
        Ok(self.forward(x))
    }

    /// Normalized attention weights, shaped `[batch_size, radix, channels]`.
    ///
    /// For `radix > 1` the weights of every channel sum to one across the radix
    /// axis; for `radix == 1` they are independent sigmoid gates.
    pub fn attention(&self, x: Tensor<B, 4>) -> NnResult<Tensor<B, 3>> {
        self.check_input(&x)?;
        let x = self.split_features(x);
        let descriptor = if self.radix > 1 {
            let [batch, _, height, width] = x.dims();
            x.reshape([batch, self.radix, self.channels, height, width])
                .sum_dim(1)
                .squeeze::<4>(1)
        } else {
            x
        };
        Ok(self.attention_from_descriptor(descriptor))
    }

    pub const fn radix(&self) -> usize {
        self.radix
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }

    fn check_input(&self, x: &Tensor<B, 4>) -> NnResult<()> {
        let dims = x.dims();
        if dims[1] != self.in_channels {
            return Err(NnError::InputShapeMismatch {
                expected: format!("[_, {}, _, _]", self.in_channels),
                actual: format!("{dims:?}"),
            });
        }
        Ok(())
    }

    /// Main grouped convolution computing all splits, `[batch, channels * radix, h, w]`.
    fn split_features(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        self.relu.forward(x)
    }

    fn attention_from_descriptor(&self, descriptor: Tensor<B, 4>) -> Tensor<B, 3> {
        let batch = descriptor.dims()[0];

        let gap = self.pool.forward(descriptor);
        let gap = self.fc1.forward(gap);
        let gap = self.bn1.forward(gap);
        let mut atten = self.relu.forward(gap);
        if let Some(drop) = &self.drop {
            atten = drop.forward(atten);
        }
        let atten = self.fc2.forward(atten);

        // [batch, cardinality, radix, channels / cardinality] -> radix leading
        let atten = atten
            .reshape([
                batch,
                self.cardinality,
                self.radix,
                self.channels / self.cardinality,
            ])
            .swap_dims(1, 2);
        let atten = if self.radix > 1 {
            softmax(atten, 1)
        } else {
            sigmoid(atten)
        };

        atten.reshape([batch, self.radix, self.channels])
    }
}
