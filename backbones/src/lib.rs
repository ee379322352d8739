//! Classifier backbones for cvzoo
//!
//! This crate provides a unified interface over the classifier architectures
//! of the zoo.

use burn::prelude::*;

pub use senet::{SENet, SENetConfig, SENetError, SENetResult};

/// Unified image classifier trait
pub trait Classifier<B: Backend> {
    /// Forward pass through the classifier
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, channels, height, width]`
    ///
    /// # Returns
    /// Logits of shape `[batch_size, num_classes]`
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2>;

    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Predicted class index per sample
    fn predict(&self, input: Tensor<B, 4>) -> Tensor<B, 1, Int> {
        self.forward(input).argmax(1).squeeze::<1>(1)
    }
}

impl<B: Backend> Classifier<B> for SENet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward(input)
    }

    fn num_classes(&self) -> usize {
        self.num_classes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_classifier_predict() {
        let device = Default::default();
        let model = SENetConfig::new(vec![1], 4, 4)
            .with_num_classes(5)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::random(
            [3, 3, 16, 16],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let classifier: &dyn Classifier<TestBackend> = &model;
        assert_eq!(classifier.num_classes(), 5);

        let predictions = classifier.predict(input);
        assert_eq!(predictions.dims(), [3]);
        for class in predictions.into_data().iter::<i64>() {
            assert!((0..5).contains(&class));
        }
    }
}
