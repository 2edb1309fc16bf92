// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Runs a model over a DataLoader without gradients and reports
// sample-weighted averages of the loss and the three head
// metrics. Used for per-epoch validation and the final pass
// over the held-out test split.

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::{EngBatch, EngBatcher},
    dataset::EngDataset,
};
use crate::ml::model::EngModel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub loss:              f64,
    pub primary_accuracy:  f64,
    pub contributions_mse: f64,
    pub complexity_mse:    f64,
    pub samples:           usize,
}

impl EvalMetrics {
    /// Metrics of an empty split: every value is NaN.
    pub fn empty() -> Self {
        Self {
            loss:              f64::NAN,
            primary_accuracy:  f64::NAN,
            contributions_mse: f64::NAN,
            complexity_mse:    f64::NAN,
            samples:           0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.loss.is_finite()
            && self.primary_accuracy.is_finite()
            && self.contributions_mse.is_finite()
            && self.complexity_mse.is_finite()
    }
}

pub fn evaluate<B: Backend>(model: &EngModel<B>, loader: &dyn DataLoader<EngBatch<B>>) -> EvalMetrics {
    let mut loss_sum    = 0.0f64;
    let mut contrib_sum = 0.0f64;
    let mut complex_sum = 0.0f64;
    let mut correct     = 0usize;
    let mut total       = 0usize;

    for batch in loader.iter() {
        let n   = batch.primary_field.dims()[0];
        let out = model.forward(batch.numeric, batch.tokens);

        let hits: i64 = out.primary_logits
            .clone()
            .argmax(1)
            .reshape([n])
            .equal(batch.primary_field.clone())
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();

        let loss = out.loss(batch.primary_field, batch.contributions, batch.complexity);

        let w = n as f64;
        loss_sum    += loss.total.into_scalar().elem::<f64>() * w;
        contrib_sum += loss.contributions.into_scalar().elem::<f64>() * w;
        complex_sum += loss.complexity.into_scalar().elem::<f64>() * w;
        correct     += hits as usize;
        total       += n;
    }

    if total == 0 {
        return EvalMetrics::empty();
    }

    let t = total as f64;
    EvalMetrics {
        loss:              loss_sum / t,
        primary_accuracy:  correct as f64 / t,
        contributions_mse: contrib_sum / t,
        complexity_mse:    complex_sum / t,
        samples:           total,
    }
}

/// Evaluate a whole dataset in batches of `batch_size`, in order.
pub fn evaluate_dataset<B: Backend>(
    model:      &EngModel<B>,
    dataset:    EngDataset,
    batch_size: usize,
    device:     &B::Device,
) -> EvalMetrics {
    let loader = DataLoaderBuilder::new(EngBatcher::<B>::new(device.clone()))
        .batch_size(batch_size.max(1))
        .num_workers(1)
        .build(dataset);
    evaluate(model, loader.as_ref())
}
