//! `burn::train` metric adapters for pixAcc and mIoU.

use burn::{
    prelude::*,
    tensor::backend::Backend,
    train::metric::{Metric, MetricEntry, MetricMetadata, Numeric},
};
use std::marker::PhantomData;

use super::{input::SegmentationInput, SegmentationMetric};

// --- Segmentation Metric Config ---

#[derive(Config, Debug)]
pub struct SegmentationMetricConfig {
    pub nclass: usize,
    #[config(default = false)]
    pub ignore_background: bool,
}

impl SegmentationMetricConfig {
    pub fn init_pix_acc<B: Backend>(&self) -> PixAccMetric<B> {
        PixAccMetric {
            state: SegmentationMetric::new(self.nclass, self.ignore_background),
            _b: PhantomData,
        }
    }

    pub fn init_miou<B: Backend>(&self) -> MeanIoUMetric<B> {
        MeanIoUMetric {
            state: SegmentationMetric::new(self.nclass, self.ignore_background),
            _b: PhantomData,
        }
    }
}

/// Adds a batch to `state`; a malformed batch is logged and leaves `state` untouched.
fn update_state<B: Backend>(state: &mut SegmentationMetric, item: &SegmentationInput<B>) {
    if let Err(err) = state.update(item.output.clone(), item.target.clone()) {
        tracing::warn!(error = %err, "skipping segmentation batch");
    }
}

// --- pixAcc ---

#[derive(Debug, Clone)]
pub struct PixAccMetric<B: Backend> {
    state: SegmentationMetric,
    _b: PhantomData<B>,
}

impl<B: Backend> PixAccMetric<B> {
    /// Adds a batch and returns the running value.
    pub fn accumulate(&mut self, item: &SegmentationInput<B>) -> f64 {
        update_state(&mut self.state, item);
        self.state.get().0
    }
}

impl<B: Backend> Metric for PixAccMetric<B> {
    type Input = SegmentationInput<B>;

    fn name(&self) -> String {
        "pixAcc".to_string()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let value = self.accumulate(item);
        MetricEntry::new(self.name(), format!("{value:.4}"), format!("{value:.4}"))
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for PixAccMetric<B> {
    fn value(&self) -> f64 {
        self.state.get().0
    }
}

// --- mIoU ---

#[derive(Debug, Clone)]
pub struct MeanIoUMetric<B: Backend> {
    state: SegmentationMetric,
    _b: PhantomData<B>,
}

impl<B: Backend> MeanIoUMetric<B> {
    /// Adds a batch and returns the running value.
    pub fn accumulate(&mut self, item: &SegmentationInput<B>) -> f64 {
        update_state(&mut self.state, item);
        self.state.get().1
    }
}

impl<B: Backend> Metric for MeanIoUMetric<B> {
    type Input = SegmentationInput<B>;

    fn name(&self) -> String {
        "mIoU".to_string()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let value = self.accumulate(item);
        MetricEntry::new(self.name(), format!("{value:.4}"), format!("{value:.4}"))
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for MeanIoUMetric<B> {
    fn value(&self) -> f64 {
        self.state.get().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    /// Every pixel predicts class 1 on a 1x2 image.
    fn batch(target: [i64; 2]) -> SegmentationInput<TestBackend> {
        let device = Default::default();
        SegmentationInput {
            output: Tensor::<TestBackend, 4>::from_floats([[[[0.0, 0.0]], [[1.0, 1.0]]]], &device),
            target: Tensor::<TestBackend, 3, Int>::from_ints([[target]], &device),
        }
    }

    fn mismatched_batch() -> SegmentationInput<TestBackend> {
        let device = Default::default();
        SegmentationInput {
            output: Tensor::<TestBackend, 4>::zeros([1, 2, 1, 2], &device),
            target: Tensor::<TestBackend, 3, Int>::zeros([1, 3, 3], &device),
        }
    }

    #[test]
    fn pix_acc_tracks_aggregator() {
        let config = SegmentationMetricConfig::new(2);
        let mut metric = config.init_pix_acc::<TestBackend>();
        let mut reference = SegmentationMetric::new(2, false);
        assert_eq!(metric.name(), "pixAcc");

        for target in [[0, 1], [1, 1]] {
            let item = batch(target);
            let value = metric.accumulate(&item);
            reference
                .update(item.output.clone(), item.target.clone())
                .unwrap();
            assert_eq!(value, reference.get().0);
            assert_eq!(metric.value(), reference.get().0);
        }
        // 3 of 4 pixels correct
        assert!((metric.value() - 0.75).abs() < 1e-9);

        metric.clear();
        assert_eq!(metric.value(), 0.0);
    }

    #[test]
    fn miou_tracks_aggregator() {
        let mut metric = SegmentationMetricConfig::new(2).init_miou::<TestBackend>();
        assert_eq!(metric.name(), "mIoU");

        let value = metric.accumulate(&batch([0, 1]));
        // class 0: 0 / 1, class 1: 1 / 2
        assert!((value - 0.25).abs() < 1e-9);
        assert_eq!(metric.value(), value);

        metric.clear();
        assert_eq!(metric.value(), 0.0);
    }

    #[test]
    fn mismatched_batch_leaves_state_unchanged() {
        let config = SegmentationMetricConfig::new(2);
        let mut pix_acc = config.init_pix_acc::<TestBackend>();
        let mut miou = config.init_miou::<TestBackend>();

        pix_acc.accumulate(&batch([0, 1]));
        miou.accumulate(&batch([0, 1]));
        let before = (pix_acc.value(), miou.value());

        assert_eq!(pix_acc.accumulate(&mismatched_batch()), before.0);
        assert_eq!(miou.accumulate(&mismatched_batch()), before.1);
        assert_eq!((pix_acc.value(), miou.value()), before);
    }
}
