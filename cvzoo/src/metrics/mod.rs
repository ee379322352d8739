//! Evaluation metrics for semantic segmentation.
//!
//! Predictions are class scores `[batch_size, num_classes, height, width]`; targets
//! are integer class maps `[batch_size, height, width]`. The predicted class of a
//! pixel is the argmax over the class axis.

pub mod aggregator;
pub mod input;
pub mod intersection_union;
pub mod pixel_accuracy;
#[cfg(feature = "train")]
pub mod train;

pub use aggregator::*;
pub use input::*;
pub use intersection_union::*;
pub use pixel_accuracy::*;
#[cfg(feature = "train")]
pub use train::*;

use burn::{prelude::*, tensor::backend::Backend};

use crate::error::{ZooError, ZooResult};

/// Checks that `output` and `target` cover the same pixels.
pub(crate) fn check_shapes<B: Backend>(
    output: &Tensor<B, 4>,
    target: &Tensor<B, 3, Int>,
) -> ZooResult<()> {
    let [batch, _, height, width] = output.dims();
    let target_dims = target.dims();
    if target_dims != [batch, height, width] {
        return Err(ZooError::InvalidTensorShape {
            expected: format!("[{batch}, {height}, {width}]"),
            actual: format!("{target_dims:?}"),
        });
    }
    Ok(())
}

/// Per-pixel predicted class, `[batch_size, height, width]`.
pub(crate) fn predicted_classes<B: Backend>(output: Tensor<B, 4>) -> Tensor<B, 3, Int> {
    output.argmax(1).squeeze::<3>(1)
}
