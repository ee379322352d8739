//! Pixel accuracy.

use burn::{
    prelude::*,
    tensor::{backend::Backend, ElementConversion},
};

use super::{check_shapes, predicted_classes};
use crate::error::ZooResult;

/// Correctly classified and labeled pixel counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelAccuracy {
    pub correct: u64,
    pub labeled: u64,
}

impl PixelAccuracy {
    /// `correct / labeled`, or zero when nothing is labeled.
    pub fn value(&self) -> f64 {
        if self.labeled == 0 {
            return 0.0;
        }
        self.correct as f64 / self.labeled as f64
    }
}

/// Counts correctly classified pixels in a batch.
///
/// With `ignore_background` only pixels whose target class is positive are labeled,
/// so class 0 and negative (ignore) labels never count; otherwise every target
/// pixel is labeled.
///
/// # Errors
///
/// Returns [`ZooError::InvalidTensorShape`](crate::ZooError::InvalidTensorShape) if
/// `target` does not match the batch and spatial size of `output`.
pub fn batch_pix_accuracy<B: Backend>(
    output: Tensor<B, 4>,
    target: Tensor<B, 3, Int>,
    ignore_background: bool,
) -> ZooResult<PixelAccuracy> {
    check_shapes(&output, &target)?;
    let predict = predicted_classes(output);
    let matches = predict.equal(target.clone()).int();

    let (correct, labeled) = if ignore_background {
        let labeled_mask = target.greater_elem(0).int();
        let labeled = labeled_mask.clone().sum().into_scalar().elem::<i64>();
        let correct = (matches * labeled_mask).sum().into_scalar().elem::<i64>();
        (correct, labeled)
    } else {
        let labeled = target.shape().num_elements() as i64;
        let correct = matches.sum().into_scalar().elem::<i64>();
        (correct, labeled)
    };

    Ok(PixelAccuracy {
        correct: correct.max(0) as u64,
        labeled: labeled.max(0) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    /// Two classes on a 2x2 image; predictions are [[1, 0], [1, 1]].
    fn sample(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::<TestBackend, 4>::from_floats(
            [[[[0.1, 0.9], [0.2, 0.3]], [[0.8, 0.1], [0.7, 0.6]]]],
            device,
        )
    }

    #[test]
    fn test_all_pixels_labeled() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 3, Int>::from_ints([[[1, 0], [0, 1]]], &device);

        let acc = batch_pix_accuracy(sample(&device), target, false).unwrap();
        assert_eq!(acc, PixelAccuracy { correct: 3, labeled: 4 });
        assert!((acc.value() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_ignore_background() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 3, Int>::from_ints([[[1, 0], [0, 1]]], &device);

        // Only the two class-1 pixels are labeled, both predicted correctly
        let acc = batch_pix_accuracy(sample(&device), target, true).unwrap();
        assert_eq!(acc, PixelAccuracy { correct: 2, labeled: 2 });
    }

    #[test]
    fn test_shape_mismatch() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 3, Int>::zeros([1, 3, 2], &device);
        assert!(batch_pix_accuracy(sample(&device), target, false).is_err());
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(PixelAccuracy::default().value(), 0.0);
    }
}
