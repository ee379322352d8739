use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d, Relu,
    },
    prelude::*,
};
use core::f64::consts::SQRT_2;
use cvzoo_nn::{SqueezeExcite, SqueezeExciteConfig};

use crate::{SENetError, SENetResult};

/// Channel expansion of the last 1x1 convolution of an [`SEBlock`].
pub const EXPANSION: usize = 2;

fn conv_initializer() -> Initializer {
    Initializer::KaimingNormal {
        gain: SQRT_2,
        fan_out_only: true,
    }
}

/// Configuration for [`SEBlock`].
#[derive(Config, Debug)]
pub struct SEBlockConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of groups of the 3x3 convolution.
    pub cardinality: usize,
    /// Width of each group.
    pub bottleneck_width: usize,
    #[config(default = 1)]
    pub stride: usize,
    /// Project the residual with a strided 3x3 convolution.
    #[config(default = false)]
    pub downsample: bool,
    #[config(default = true)]
    pub use_se: bool,
}

impl SEBlockConfig {
    /// Number of output channels, `EXPANSION * cardinality * bottleneck_width`.
    pub const fn out_channels(&self) -> usize {
        EXPANSION * self.cardinality * self.bottleneck_width
    }

    /// Initializes a new [`SEBlock`].
    ///
    /// # Errors
    ///
    /// Returns [`SENetError::InvalidConfiguration`] if the reduced width cannot be split
    /// into `cardinality` groups, or a wrapped layer error from the squeeze-excite gate.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SENetResult<SEBlock<B>> {
        let group_width = self.cardinality * self.bottleneck_width;
        let reduced = group_width / 2;
        if self.in_channels == 0 || self.stride == 0 {
            return Err(SENetError::InvalidConfiguration {
                reason: "in_channels and stride must be greater than zero".to_string(),
            });
        }
        if reduced == 0 || reduced % self.cardinality != 0 {
            return Err(SENetError::InvalidConfiguration {
                reason: format!(
                    "group width {group_width} halves to {reduced}, which cannot be split into {} groups",
                    self.cardinality
                ),
            });
        }
        let out_channels = self.out_channels();

        let conv1 = Conv2dConfig::new([self.in_channels, reduced], [1, 1])
            .with_bias(false)
            .with_initializer(conv_initializer())
            .init(device);
        let conv2 = Conv2dConfig::new([reduced, group_width], [3, 3])
            .with_stride([self.stride, self.stride])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_groups(self.cardinality)
            .with_bias(false)
            .with_initializer(conv_initializer())
            .init(device);
        let conv3 = Conv2dConfig::new([group_width, out_channels], [1, 1])
            .with_bias(false)
            .with_initializer(conv_initializer())
            .init(device);

        let se = if self.use_se {
            Some(SqueezeExciteConfig::new(out_channels).init(device)?)
        } else {
            None
        };

        let downsample = self
            .downsample
            .then(|| Downsample::new(self.in_channels, out_channels, self.stride, device));

        Ok(SEBlock {
            conv1,
            bn1: BatchNormConfig::new(reduced).init(device),
            conv2,
            bn2: BatchNormConfig::new(group_width).init(device),
            conv3,
            bn3: BatchNormConfig::new(out_channels).init(device),
            relu: Relu::new(),
            se,
            downsample,
        })
    }
}

/// ResNeXt bottleneck with optional squeeze-and-excitation.
///
/// # Shapes
///   - input: `[batch_size, in_channels, height, width]`
///   - output: `[batch_size, 2 * cardinality * bottleneck_width, height / stride, width / stride]`
#[derive(Module, Debug)]
pub struct SEBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    conv3: Conv2d<B>,
    bn3: BatchNorm<B, 2>,
    relu: Relu,
    se: Option<SqueezeExcite<B>>,
    downsample: Option<Downsample<B>>,
}

impl<B: Backend> SEBlock<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let residual = match &self.downsample {
            Some(downsample) => downsample.forward(input.clone()),
            None => input.clone(),
        };

        let out = self.conv1.forward(input);
        let out = self.bn1.forward(out);
        let out = self.relu.forward(out);

        let out = self.conv2.forward(out);
        let out = self.bn2.forward(out);
        let out = self.relu.forward(out);

        let out = self.conv3.forward(out);
        let out = self.bn3.forward(out);

        let out = match &self.se {
            Some(se) => se.forward(out),
            None => out,
        };

        self.relu.forward(out + residual)
    }
}

/// Residual projection: strided 3x3 conv + bn.
#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
}

impl<B: Backend> Downsample<B> {
    pub fn new(in_channels: usize, out_channels: usize, stride: usize, device: &Device<B>) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_bias(false)
            .with_initializer(conv_initializer())
            .init(device);

        Self {
            conv,
            bn: BatchNormConfig::new(out_channels).init(device),
        }
    }

    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(input))
    }
}

/// A stage of [`SEBlock`]s sharing one output width.
#[derive(Module, Debug)]
pub struct LayerBlock<B: Backend> {
    blocks: Vec<SEBlock<B>>,
}

impl<B: Backend> LayerBlock<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.blocks
            .iter()
            .fold(input, |out, block| block.forward(out))
    }

    /// Builds `num_blocks` blocks; only the first one strides and may downsample.
    pub fn new(
        num_blocks: usize,
        in_channels: usize,
        cardinality: usize,
        bottleneck_width: usize,
        stride: usize,
        use_se: bool,
        device: &Device<B>,
    ) -> SENetResult<Self> {
        let first = SEBlockConfig::new(in_channels, cardinality, bottleneck_width)
            .with_stride(stride)
            .with_use_se(use_se);
        let out_channels = first.out_channels();
        let first = first.with_downsample(in_channels != out_channels || stride != 1);

        let mut blocks = Vec::with_capacity(num_blocks);
        blocks.push(first.init(device)?);
        for _ in 1..num_blocks {
            blocks.push(
                SEBlockConfig::new(out_channels, cardinality, bottleneck_width)
                    .with_use_se(use_se)
                    .init(device)?,
            );
        }

        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_block_identity_residual() {
        let device = Default::default();
        let block = SEBlockConfig::new(32, 4, 4)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(block.downsample.is_none());
        assert!(block.se.is_some());

        let input = Tensor::<TestBackend, 4>::random(
            [2, 32, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(block.forward(input).dims(), [2, 32, 8, 8]);
    }

    #[test]
    fn test_block_downsample() {
        let device = Default::default();
        let block = SEBlockConfig::new(32, 4, 8)
            .with_stride(2)
            .with_downsample(true)
            .with_use_se(false)
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(block.se.is_none());

        let input = Tensor::<TestBackend, 4>::random(
            [1, 32, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        assert_eq!(block.forward(input).dims(), [1, 64, 4, 4]);
    }

    #[test]
    fn test_layer_block_downsamples_first_block_only() {
        let device = Default::default();
        let layer = LayerBlock::<TestBackend>::new(3, 16, 4, 4, 2, false, &device).unwrap();
        assert_eq!(layer.len(), 3);
        assert!(layer.blocks[0].downsample.is_some());
        assert!(layer.blocks[1].downsample.is_none());
        assert!(layer.blocks[2].downsample.is_none());
    }

    #[test]
    fn test_indivisible_group_width() {
        let device = Default::default();
        // 3 * 1 = 3 halves to 1, which cannot be split into 3 groups
        let result = SEBlockConfig::new(16, 3, 1).init::<TestBackend>(&device);
        assert!(matches!(
            result,
            Err(SENetError::InvalidConfiguration { .. })
        ));
    }
}
