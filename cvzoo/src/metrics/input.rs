//! Input structures for the segmentation metrics.

use burn::{prelude::*, tensor::backend::Backend};

/// Class scores paired with the ground-truth class map.
pub struct SegmentationInput<B: Backend> {
    /// `[batch_size, num_classes, height, width]`
    pub output: Tensor<B, 4>,
    /// `[batch_size, height, width]`
    pub target: Tensor<B, 3, Int>,
}

impl<B: Backend> SegmentationInput<B> {
    pub const fn new(output: Tensor<B, 4>, target: Tensor<B, 3, Int>) -> Self {
        Self { output, target }
    }
}
