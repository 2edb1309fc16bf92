// ============================================================
// Layer 6 — Training History Logger
// ============================================================
// Appends one CSV row per epoch to <artifact>/history.csv so the
// loss and accuracy curves can be inspected or plotted offline.
//
// Example output:
//   epoch,train_loss,train_accuracy,val_loss,val_accuracy,val_contributions_mse,val_complexity_mse
//   1,412.503100,0.120000,398.120400,0.150000,790.004000,2.150000
//   2,301.884200,0.210000,288.920100,0.240000,571.100300,1.420000
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::ml::evaluator::EvalMetrics;

const HEADER: &str =
    "epoch,train_loss,train_accuracy,val_loss,val_accuracy,val_contributions_mse,val_complexity_mse";

/// One row of the training history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:          usize,
    /// Sample-weighted combined loss over the training batches
    pub train_loss:     f64,
    /// Primary-field accuracy over the training batches
    pub train_accuracy: f64,
    /// Validation split metrics (NaN when the split is empty)
    pub validation:     EvalMetrics,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_accuracy: f64, validation: EvalMetrics) -> Self {
        Self { epoch, train_loss, train_accuracy, validation }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.validation.loss < best_val_loss
    }
}

/// Writes epoch metrics to a CSV file. Each training run starts a
/// fresh file, since artifacts are never retrained in place.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("history.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created history CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.train_accuracy,
            m.validation.loss,
            m.validation.primary_accuracy,
            m.validation.contributions_mse,
            m.validation.complexity_mse,
        )?;

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn val(loss: f64) -> EvalMetrics {
        EvalMetrics {
            loss,
            primary_accuracy:  0.5,
            contributions_mse: 12.0,
            complexity_mse:    0.7,
            samples:           8,
        }
    }

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 0.4, val(2.3));
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_log_appends_rows_after_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 3.0, 0.1, val(2.9))).unwrap();
        logger.log(&EpochMetrics::new(2, 2.0, 0.2, val(1.9))).unwrap();

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].starts_with("2,2.000000,0.200000,1.900000"));
    }
}
