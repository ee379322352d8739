//! cvzoo: a computer-vision model zoo for Burn.
//!
//! Registered classifiers are built by name through [`get_model`]; the [`metrics`]
//! module evaluates semantic segmentation outputs. Layers shared by the
//! architectures live in [`nn`].

mod config;
mod error;
pub mod metrics;
mod zoo;

pub use config::{ModelName, ModelOptions};
pub use error::{ZooError, ZooResult};
pub use metrics::{
    batch_intersection_union, batch_pix_accuracy, IntersectionUnion, PixelAccuracy,
    SegmentationInput, SegmentationMetric,
};
pub use zoo::{check_input_size, get_model, get_model_by_name, list_models};

#[doc(inline)]
pub use backbones::{Classifier, SENet, SENetConfig};
#[doc(inline)]
pub use cvzoo_nn as nn;
