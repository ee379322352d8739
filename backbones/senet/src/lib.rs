//! SENet and ResNeXt classifiers.
//!
//! Both families share the same aggregated-residual bottleneck ("Aggregated Residual
//! Transformations for Deep Neural Networks", arXiv:1611.05431); SENet adds a
//! squeeze-and-excitation gate to every block.

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
    BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Initializer, Linear, LinearConfig,
    PaddingConfig2d, Relu,
};
use burn::prelude::*;
use core::f64::consts::SQRT_2;
use thiserror::Error;

mod blocks;
pub use blocks::*;

// Residual stage configs by depth
const RESNEXT50_BLOCKS: [usize; 4] = [3, 4, 6, 3];
const RESNEXT101_BLOCKS: [usize; 4] = [3, 4, 23, 3];
const RESNEXT152_BLOCKS: [usize; 4] = [3, 8, 36, 3];

/// Supported depths, in ascending order.
pub const SUPPORTED_DEPTHS: [usize; 3] = [50, 101, 152];

/// Width of the stem and input width of the first stage.
const STEM_CHANNELS: usize = 64;

/// Errors raised while building SENet models.
#[derive(Error, Debug)]
pub enum SENetError {
    /// The requested depth has no stage layout.
    #[error("Invalid number of layers: {depth}. Options are {options:?}")]
    UnsupportedDepth {
        depth: usize,
        options: Vec<usize>,
    },

    /// Logically inconsistent widths or counts.
    #[error("Invalid SENet configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A layer refused its parameters.
    #[error(transparent)]
    Layer(#[from] cvzoo_nn::NnError),
}

pub type SENetResult<T> = Result<T, SENetError>;

/// Stage layout for a ResNeXt depth.
pub fn stage_layout(depth: usize) -> SENetResult<[usize; 4]> {
    match depth {
        50 => Ok(RESNEXT50_BLOCKS),
        101 => Ok(RESNEXT101_BLOCKS),
        152 => Ok(RESNEXT152_BLOCKS),
        _ => Err(SENetError::UnsupportedDepth {
            depth,
            options: SUPPORTED_DEPTHS.to_vec(),
        }),
    }
}

/// SENet configuration
#[derive(Config, Debug)]
pub struct SENetConfig {
    /// Number of blocks in each stage, e.g. [3, 4, 6, 3]
    pub layers: Vec<usize>,
    /// Number of groups
    pub cardinality: usize,
    /// Width of each group in the first stage; doubles every stage
    pub bottleneck_width: usize,
    #[config(default = 1000)]
    pub num_classes: usize,
    /// Gate every block with squeeze-and-excitation
    #[config(default = false)]
    pub use_se: bool,
    /// Dropout before the classifier
    #[config(default = 0.2)]
    pub dropout: f64,
    /// Image channels
    #[config(default = 3)]
    pub in_channels: usize,
}

impl SENetConfig {
    /// Configuration for a supported depth (50, 101 or 152).
    pub fn from_depth(
        depth: usize,
        cardinality: usize,
        bottleneck_width: usize,
    ) -> SENetResult<Self> {
        let layers = stage_layout(depth)?;
        Ok(Self::new(layers.to_vec(), cardinality, bottleneck_width))
    }

    /// ResNeXt-50 32x4d
    pub fn resnext50_32x4d() -> Self {
        Self::new(RESNEXT50_BLOCKS.to_vec(), 32, 4)
    }

    /// ResNeXt-101 32x4d
    pub fn resnext101_32x4d() -> Self {
        Self::new(RESNEXT101_BLOCKS.to_vec(), 32, 4)
    }

    /// ResNeXt-101 64x4d
    pub fn resnext101_64x4d() -> Self {
        Self::new(RESNEXT101_BLOCKS.to_vec(), 64, 4)
    }

    /// SENet-154: depth 152, 64x4d, squeeze-and-excitation on.
    pub fn senet_154() -> Self {
        Self::new(RESNEXT152_BLOCKS.to_vec(), 64, 4).with_use_se(true)
    }

    /// Channels produced by the last stage.
    pub fn out_features(&self) -> usize {
        // Output width doubles per stage along with the bottleneck width
        self.cardinality * self.bottleneck_width * EXPANSION.pow(self.layers.len() as u32)
    }

    fn validate(&self) -> SENetResult<()> {
        if self.layers.is_empty() || self.layers.contains(&0) {
            return Err(SENetError::InvalidConfiguration {
                reason: format!("every stage needs at least one block, got {:?}", self.layers),
            });
        }
        if self.cardinality == 0 || self.bottleneck_width == 0 {
            return Err(SENetError::InvalidConfiguration {
                reason: "cardinality and bottleneck width must be greater than zero".to_string(),
            });
        }
        if self.num_classes == 0 || self.in_channels == 0 {
            return Err(SENetError::InvalidConfiguration {
                reason: "num_classes and in_channels must be greater than zero".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(SENetError::InvalidConfiguration {
                reason: format!("dropout must be in [0, 1), got {}", self.dropout),
            });
        }
        Ok(())
    }

    /// Initialize the SENet model
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SENetResult<SENet<B>> {
        self.validate()?;

        let stem = StemBlock::new(self.in_channels, STEM_CHANNELS, device);

        let mut in_channels = STEM_CHANNELS;
        let mut bottleneck_width = self.bottleneck_width;
        let mut stages = Vec::with_capacity(self.layers.len());
        for (i, &num_blocks) in self.layers.iter().enumerate() {
            let stride = if i == 0 { 1 } else { 2 };
            stages.push(LayerBlock::new(
                num_blocks,
                in_channels,
                self.cardinality,
                bottleneck_width,
                stride,
                self.use_se,
                device,
            )?);
            in_channels = EXPANSION * self.cardinality * bottleneck_width;
            bottleneck_width *= 2;
        }

        Ok(SENet {
            stem,
            stages,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(in_channels, self.num_classes).init(device),
            num_classes: self.num_classes,
        })
    }
}

/// SENet / ResNeXt image classifier.
///
/// # Shapes
///   - input: `[batch_size, in_channels, height, width]`
///   - output: `[batch_size, num_classes]` logits
#[derive(Module, Debug)]
pub struct SENet<B: Backend> {
    stem: StemBlock<B>,
    stages: Vec<LayerBlock<B>>,
    pool: AdaptiveAvgPool2d,
    dropout: Dropout,
    output: Linear<B>,
    num_classes: usize,
}

impl<B: Backend> SENet<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.features(input);
        let x = self.pool.forward(x);
        let x = x.flatten::<2>(1, 3);
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }

    /// Feature map of the last stage, before pooling.
    pub fn features(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.stem.forward(input);
        self.stages.iter().fold(x, |x, stage| stage.forward(x))
    }

    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }
}

/// Deep stem: three 3x3 conv + bn + relu, then a 3x3 stride-2 max-pool.
#[derive(Module, Debug)]
pub struct StemBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    conv3: Conv2d<B>,
    bn3: BatchNorm<B, 2>,
    relu: Relu,
    maxpool: MaxPool2d,
}

impl<B: Backend> StemBlock<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = self.relu.forward(self.bn1.forward(self.conv1.forward(input)));
        let out = self.relu.forward(self.bn2.forward(self.conv2.forward(out)));
        let out = self.relu.forward(self.bn3.forward(self.conv3.forward(out)));
        self.maxpool.forward(out)
    }

    pub fn new(in_channels: usize, out_channels: usize, device: &Device<B>) -> Self {
        let conv = |channels: [usize; 2], stride: usize| {
            Conv2dConfig::new(channels, [3, 3])
                .with_stride([stride, stride])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_bias(false)
                .with_initializer(Initializer::KaimingNormal {
                    gain: SQRT_2,
                    fan_out_only: true,
                })
                .init(device)
        };

        let maxpool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        Self {
            conv1: conv([in_channels, out_channels], 2),
            bn1: BatchNormConfig::new(out_channels).init(device),
            conv2: conv([out_channels, out_channels], 1),
            bn2: BatchNormConfig::new(out_channels).init(device),
            conv3: conv([out_channels, out_channels], 1),
            bn3: BatchNormConfig::new(out_channels).init(device),
            relu: Relu::new(),
            maxpool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> SENetConfig {
        SENetConfig::new(vec![1, 1], 4, 4).with_num_classes(10)
    }

    #[test]
    fn test_stage_layouts() {
        assert_eq!(stage_layout(50).unwrap(), [3, 4, 6, 3]);
        assert_eq!(stage_layout(101).unwrap(), [3, 4, 23, 3]);
        assert_eq!(stage_layout(152).unwrap(), [3, 8, 36, 3]);
    }

    #[test]
    fn test_unsupported_depth() {
        match SENetConfig::from_depth(34, 32, 4) {
            Err(SENetError::UnsupportedDepth { depth, options }) => {
                assert_eq!(depth, 34);
                assert_eq!(options, vec![50, 101, 152]);
            }
            other => panic!("Expected UnsupportedDepth, got {other:?}"),
        }
    }

    #[test]
    fn test_named_configs() {
        let config = SENetConfig::senet_154();
        assert_eq!(config.layers, vec![3, 8, 36, 3]);
        assert_eq!(config.cardinality, 64);
        assert_eq!(config.bottleneck_width, 4);
        assert!(config.use_se);

        let config = SENetConfig::resnext50_32x4d();
        assert!(!config.use_se);
        assert_eq!(config.num_classes, 1000);
        // 32 * 4 * 2^4
        assert_eq!(config.out_features(), 2048);
    }

    #[test]
    fn test_senet_forward() {
        let device = Default::default();
        let model = tiny_config()
            .with_use_se(true)
            .init::<TestBackend>(&device)
            .unwrap();
        assert_eq!(model.num_stages(), 2);
        assert_eq!(model.num_classes(), 10);

        let input = Tensor::<TestBackend, 4>::random(
            [2, 3, 32, 32],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        // 32 -> 16 (stem) -> 8 (maxpool) -> 8 (stage 1) -> 4 (stage 2)
        assert_eq!(model.features(input.clone()).dims(), [2, 64, 4, 4]);
        assert_eq!(model.forward(input).dims(), [2, 10]);
    }

    #[test]
    fn test_invalid_configs() {
        let device = Default::default();
        let empty = SENetConfig::new(vec![], 4, 4).init::<TestBackend>(&device);
        assert!(matches!(empty, Err(SENetError::InvalidConfiguration { .. })));

        let zero_stage = SENetConfig::new(vec![1, 0], 4, 4).init::<TestBackend>(&device);
        assert!(matches!(
            zero_stage,
            Err(SENetError::InvalidConfiguration { .. })
        ));

        let dropout = tiny_config()
            .with_dropout(1.5)
            .init::<TestBackend>(&device);
        assert!(matches!(dropout, Err(SENetError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_se_width_too_small() {
        let device = Default::default();
        // First stage outputs 2 * 2 * 2 = 8 channels, which cannot be squeezed by 16
        let result = SENetConfig::new(vec![1], 2, 2)
            .with_use_se(true)
            .init::<TestBackend>(&device);
        assert!(matches!(result, Err(SENetError::Layer(_))));
    }
}
