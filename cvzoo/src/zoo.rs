//! Model factory.

use backbones::SENet;
use burn::prelude::*;

use crate::{
    config::{ModelName, ModelOptions},
    error::{ZooError, ZooResult},
};

/// Builds a registered model with freshly initialized parameters.
///
/// # Errors
///
/// Returns [`ZooError::Backbone`] if the options produce an invalid architecture.
pub fn get_model<B: Backend>(
    name: ModelName,
    options: &ModelOptions,
    device: &Device<B>,
) -> ZooResult<SENet<B>> {
    let config = name
        .backbone_config()
        .with_num_classes(options.num_classes)
        .with_dropout(options.dropout)
        .with_in_channels(options.in_channels);

    tracing::debug!(
        model = %name,
        classes = options.num_classes,
        stages = ?config.layers,
        se = config.use_se,
        "building model",
    );
    Ok(config.init(device)?)
}

/// Looks a model up by its registry key and builds it.
///
/// # Errors
///
/// Returns [`ZooError::UnknownModel`] if `name` is not registered.
pub fn get_model_by_name<B: Backend>(
    name: &str,
    options: &ModelOptions,
    device: &Device<B>,
) -> ZooResult<SENet<B>> {
    get_model(name.parse()?, options, device)
}

/// Registry keys of every buildable model.
pub fn list_models() -> Vec<&'static str> {
    ModelName::ALL.iter().map(ModelName::as_str).collect()
}

/// Validates an input resolution before running a dummy forward pass.
///
/// The stem and the three strided stages reduce the resolution by 32.
pub fn check_input_size(input_size: usize) -> ZooResult<()> {
    if input_size < 32 {
        return Err(ZooError::InvalidConfiguration {
            reason: format!("input size must be at least 32 pixels, got {input_size}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_list_models() {
        let models = list_models();
        assert_eq!(models.len(), 7);
        assert_eq!(models[0], "resnext50_32x4d");
        assert_eq!(models[6], "senet_154");
    }

    #[test]
    fn test_unknown_model_by_name() {
        let device = Default::default();
        let result = get_model_by_name::<TestBackend>("efficientnet_b0", &ModelOptions::new(), &device);
        assert!(matches!(result, Err(ZooError::UnknownModel { .. })));
    }

    #[test]
    fn test_invalid_options_surface_backbone_error() {
        let device = Default::default();
        let options = ModelOptions::new().with_num_classes(0);
        let result = get_model::<TestBackend>(ModelName::ResNext50_32x4d, &options, &device);
        assert!(matches!(result, Err(ZooError::Backbone(_))));
    }

    #[test]
    fn test_input_size_check() {
        assert!(check_input_size(224).is_ok());
        assert!(check_input_size(16).is_err());
    }
}
