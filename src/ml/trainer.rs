// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
//   - Training uses TrainBackend (Autodiff<…>) for gradients
//   - model.valid() returns the model on InferBackend: dropout
//     off, batch-norm on running statistics
//   - The validation batcher therefore uses InferBackend too
//   - argmax(1) returns [batch, 1], reshaped before .equal()
//
// No early stopping and no per-epoch checkpoints: the weights
// after the last epoch are the ones that get saved.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::EngBatcher, dataset::EngDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{
    evaluator::evaluate,
    model::{EngModel, EngModelConfig},
    InferBackend, TrainBackend,
};

pub struct TrainingOutcome {
    /// Final weights, already moved to the inference backend.
    pub model:   EngModel<InferBackend>,
    pub history: Vec<EpochMetrics>,
}

pub fn run_training(
    cfg:           &TrainConfig,
    model_cfg:     &EngModelConfig,
    train_dataset: EngDataset,
    val_dataset:   EngDataset,
    logger:        &MetricsLogger,
) -> Result<TrainingOutcome> {
    if train_dataset.is_empty() {
        bail!("Training split is empty; provide more rows or lower the held-out fractions");
    }
    if cfg.batch_size == 0 {
        bail!("batch_size must be positive");
    }

    let device: <InferBackend as Backend>::Device = Default::default();
    tracing::info!("Using device: {:?}", device);
    <TrainBackend as Backend>::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: EngModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: variant={}, inputs={}, hidden={}/{}",
        if model_cfg.uses_text() { "text" } else { "numeric" },
        model_cfg.numeric_features,
        model_cfg.hidden_1,
        model_cfg.hidden_2,
    );

    let mut optim = AdamConfig::new().init();

    // ── Training data loader (AutodiffBackend, reshuffled every epoch) ────────
    let train_loader = DataLoaderBuilder::new(EngBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InferBackend, no autodiff) ───────────────────
    let val_loader = DataLoaderBuilder::new(EngBatcher::<InferBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;
    let mut best_epoch    = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
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
            loss_sum += loss.total.clone().into_scalar().elem::<f64>() * n as f64;
            correct  += hits as usize;
            seen     += n;

            // Backward pass + Adam update
            let grads = loss.total.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss     = if seen > 0 { loss_sum / seen as f64 } else { f64::NAN };
        let train_accuracy = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };

        let validation = evaluate(&model.valid(), val_loader.as_ref());

        println!(
            "Epoch {:>3}/{} | loss={:.4} | acc={:.1}% | val_loss={:.4} | val_acc={:.1}% | val_contrib_mse={:.3} | val_complexity_mse={:.3}",
            epoch, cfg.epochs, train_loss, train_accuracy * 100.0,
            validation.loss, validation.primary_accuracy * 100.0,
            validation.contributions_mse, validation.complexity_mse,
        );

        let metrics = EpochMetrics::new(epoch, train_loss, train_accuracy, validation);
        logger.log(&metrics)?;
        if metrics.is_improvement(best_val_loss) {
            best_val_loss = metrics.validation.loss;
            best_epoch    = epoch;
        }
        history.push(metrics);
    }

    tracing::info!(
        "Training complete after {} epochs (best val_loss={:.4} at epoch {})",
        cfg.epochs, best_val_loss, best_epoch
    );
    Ok(TrainingOutcome { model: model.valid(), history })
}
