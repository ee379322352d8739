//! Running pixAcc / mIoU over an evaluation set.

use burn::tensor::{backend::Backend, Int, Tensor};

use super::{batch_intersection_union, batch_pix_accuracy};
use crate::error::ZooResult;

/// Accumulates pixel accuracy and per-class areas across batches.
#[derive(Debug, Clone)]
pub struct SegmentationMetric {
    nclass: usize,
    ignore_background: bool,
    total_correct: u64,
    total_label: u64,
    total_inter: Vec<u64>,
    total_union: Vec<u64>,
}

impl SegmentationMetric {
    pub fn new(nclass: usize, ignore_background: bool) -> Self {
        let nbins = nclass.saturating_sub(usize::from(ignore_background));
        Self {
            nclass,
            ignore_background,
            total_correct: 0,
            total_label: 0,
            total_inter: vec![0; nbins],
            total_union: vec![0; nbins],
        }
    }

    /// Adds one batch of predictions.
    pub fn update<B: Backend>(
        &mut self,
        output: Tensor<B, 4>,
        target: Tensor<B, 3, Int>,
    ) -> ZooResult<()> {
        let areas = batch_intersection_union(
            output.clone(),
            target.clone(),
            self.nclass,
            self.ignore_background,
        )?;
        let accuracy = batch_pix_accuracy(output, target, self.ignore_background)?;

        self.total_correct += accuracy.correct;
        self.total_label += accuracy.labeled;
        for (total, inter) in self.total_inter.iter_mut().zip(areas.intersection) {
            *total += inter;
        }
        for (total, union) in self.total_union.iter_mut().zip(areas.union) {
            *total += union;
        }
        Ok(())
    }

    /// Current `(pixAcc, mIoU)`.
    pub fn get(&self) -> (f64, f64) {
        let pix_acc = self.total_correct as f64 / (f64::EPSILON + self.total_label as f64);
        let iou: Vec<f64> = self
            .total_inter
            .iter()
            .zip(&self.total_union)
            .map(|(&inter, &union)| inter as f64 / (f64::EPSILON + union as f64))
            .collect();
        let miou = if iou.is_empty() {
            0.0
        } else {
            iou.iter().sum::<f64>() / iou.len() as f64
        };
        (pix_acc, miou)
    }

    /// Clears the running totals.
    pub fn reset(&mut self) {
        self.total_correct = 0;
        self.total_label = 0;
        self.total_inter.fill(0);
        self.total_union.fill(0);
    }

    pub const fn nclass(&self) -> usize {
        self.nclass
    }
}
