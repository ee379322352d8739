//! Per-class intersection and union areas.

use burn::{prelude::*, tensor::backend::Backend};

use super::{check_shapes, predicted_classes};
use crate::error::{ZooError, ZooResult};

/// Per-class pixel areas of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntersectionUnion {
    /// Pixels where prediction and target agree, by class.
    pub intersection: Vec<u64>,
    /// Pixels predicted or labeled as the class, by class.
    pub union: Vec<u64>,
}

impl IntersectionUnion {
    /// IoU of every class; classes with an empty union score zero.
    pub fn per_class_iou(&self) -> Vec<f64> {
        self.intersection
            .iter()
            .zip(&self.union)
            .map(|(&inter, &union)| {
                if union == 0 {
                    0.0
                } else {
                    inter as f64 / union as f64
                }
            })
            .collect()
    }
}

/// Histograms prediction, target and agreement over the class bins.
///
/// Bins cover classes `0..nclass`, or `1..nclass` when `ignore_background` is set;
/// in that case predictions are discarded wherever the target is not positive.
/// Values outside the bins are dropped.
///
/// # Errors
///
/// Returns [`ZooError::InvalidConfiguration`] when no class bins remain and
/// [`ZooError::InvalidTensorShape`] when `target` does not match `output`.
pub fn batch_intersection_union<B: Backend>(
    output: Tensor<B, 4>,
    target: Tensor<B, 3, Int>,
    nclass: usize,
    ignore_background: bool,
) -> ZooResult<IntersectionUnion> {
    check_shapes(&output, &target)?;
    let first_class = usize::from(ignore_background);
    if nclass <= first_class {
        return Err(ZooError::InvalidConfiguration {
            reason: format!(
                "need at least {} classes, got {nclass}",
                first_class + 1
            ),
        });
    }
    let nbins = nclass - first_class;

    let predict = predicted_classes(output).into_data();
    let target = target.into_data();

    let bin = |class: i64| -> Option<usize> {
        let class = usize::try_from(class).ok()?;
        (first_class..nclass)
            .contains(&class)
            .then(|| class - first_class)
    };

    let mut area_inter = vec![0u64; nbins];
    let mut area_pred = vec![0u64; nbins];
    let mut area_lab = vec![0u64; nbins];
    for (pred, label) in predict.iter::<i64>().zip(target.iter::<i64>()) {
        let pred = if ignore_background && label <= 0 { 0 } else { pred };
        if let Some(i) = bin(pred) {
            area_pred[i] += 1;
            if pred == label {
                area_inter[i] += 1;
            }
        }
        if let Some(i) = bin(label) {
            area_lab[i] += 1;
        }
    }

    let union = area_pred
        .iter()
        .zip(&area_lab)
        .zip(&area_inter)
        .map(|((&pred, &lab), &inter)| pred + lab - inter)
        .collect();

    Ok(IntersectionUnion {
        intersection: area_inter,
        union,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    /// One-hot scores for the given class map with `nclass` classes.
    fn one_hot(classes: [[i64; 3]; 2], nclass: usize) -> Tensor<TestBackend, 4> {
        let device = Default::default();
        let mut values = Vec::with_capacity(nclass * 6);
        for c in 0..nclass {
            for row in classes {
                for class in row {
                    values.push(if class as usize == c { 1.0f32 } else { 0.0 });
                }
            }
        }
        Tensor::<TestBackend, 1>::from_floats(values.as_slice(), &device).reshape([1, nclass, 2, 3])
    }

    fn target(classes: [[i64; 3]; 2]) -> Tensor<TestBackend, 3, Int> {
        Tensor::<TestBackend, 3, Int>::from_ints([classes], &Default::default())
    }

    #[test]
    fn test_perfect_prediction() {
        let classes = [[0, 1, 2], [2, 1, 0]];
        let result = batch_intersection_union(one_hot(classes, 3), target(classes), 3, false)
            .unwrap();
        assert_eq!(result.intersection, vec![2, 2, 2]);
        assert_eq!(result.union, vec![2, 2, 2]);
        assert_eq!(result.per_class_iou(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mismatch_counts_only_agreement() {
        let predicted = [[0, 1, 1], [2, 2, 0]];
        let labels = [[0, 1, 2], [2, 1, 0]];
        let result =
            batch_intersection_union(one_hot(predicted, 3), target(labels), 3, false).unwrap();

        // class 0: pred 2, label 2, inter 2
        // class 1: pred 2, label 2, inter 1
        // class 2: pred 2, label 2, inter 1
        assert_eq!(result.intersection, vec![2, 1, 1]);
        assert_eq!(result.union, vec![2, 3, 3]);
    }

    #[test]
    fn test_ignore_background() {
        let predicted = [[1, 1, 2], [2, 0, 1]];
        let labels = [[0, 1, 2], [1, 1, 0]];
        let result =
            batch_intersection_union(one_hot(predicted, 3), target(labels), 3, true).unwrap();

        // Bins are classes 1 and 2; predictions on background pixels are dropped.
        // class 1: pred {(0,1)}, label {(0,1), (1,0), (1,1)}
        // class 2: pred {(0,2), (1,0)}, label {(0,2)}
        assert_eq!(result.intersection, vec![1, 1]);
        assert_eq!(result.union, vec![3, 2]);
    }

    #[test]
    fn test_out_of_range_labels_dropped() {
        let predicted = [[0, 1, 1], [0, 1, 1]];
        let labels = [[-1, 1, 1], [5, 1, 1]];
        let result =
            batch_intersection_union(one_hot(predicted, 2), target(labels), 2, false).unwrap();
        assert_eq!(result.intersection, vec![0, 4]);
        assert_eq!(result.union, vec![2, 4]);
    }

    #[test]
    fn test_too_few_classes() {
        let classes = [[0, 0, 0], [0, 0, 0]];
        let result = batch_intersection_union(one_hot(classes, 1), target(classes), 1, true);
        assert!(matches!(result, Err(ZooError::InvalidConfiguration { .. })));
    }
}
