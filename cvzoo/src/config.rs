//! Registered model names and construction options.

use core::{fmt, str::FromStr};

use backbones::SENetConfig;
use burn::prelude::*;

use crate::error::ZooError;

/// Architectures the zoo can build by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelName {
    ResNext50_32x4d,
    ResNext101_32x4d,
    ResNext101_64x4d,
    SeResNext50_32x4d,
    SeResNext101_32x4d,
    SeResNext101_64x4d,
    SeNet154,
}

impl ModelName {
    /// Every registered model, in listing order.
    pub const ALL: [Self; 7] = [
        Self::ResNext50_32x4d,
        Self::ResNext101_32x4d,
        Self::ResNext101_64x4d,
        Self::SeResNext50_32x4d,
        Self::SeResNext101_32x4d,
        Self::SeResNext101_64x4d,
        Self::SeNet154,
    ];

    /// Registry key of the model.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResNext50_32x4d => "resnext50_32x4d",
            Self::ResNext101_32x4d => "resnext101_32x4d",
            Self::ResNext101_64x4d => "resnext101_64x4d",
            Self::SeResNext50_32x4d => "se_resnext50_32x4d",
            Self::SeResNext101_32x4d => "se_resnext101_32x4d",
            Self::SeResNext101_64x4d => "se_resnext101_64x4d",
            Self::SeNet154 => "senet_154",
        }
    }

    /// Architecture configuration with the default 1000-class head.
    pub fn backbone_config(&self) -> SENetConfig {
        match self {
            Self::ResNext50_32x4d => SENetConfig::resnext50_32x4d(),
            Self::ResNext101_32x4d => SENetConfig::resnext101_32x4d(),
            Self::ResNext101_64x4d => SENetConfig::resnext101_64x4d(),
            Self::SeResNext50_32x4d => SENetConfig::resnext50_32x4d().with_use_se(true),
            Self::SeResNext101_32x4d => SENetConfig::resnext101_32x4d().with_use_se(true),
            Self::SeResNext101_64x4d => SENetConfig::resnext101_64x4d().with_use_se(true),
            Self::SeNet154 => SENetConfig::senet_154(),
        }
    }

    /// Comma separated registry keys, for error messages and listings.
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = ZooError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == key)
            .ok_or_else(|| ZooError::UnknownModel {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

/// Options applied on top of a registered architecture.
#[derive(Config, Debug)]
pub struct ModelOptions {
    /// Number of classification classes.
    #[config(default = 1000)]
    pub num_classes: usize,
    /// Dropout before the classifier.
    #[config(default = 0.2)]
    pub dropout: f64,
    /// Image channels.
    #[config(default = 3)]
    pub in_channels: usize,
}
