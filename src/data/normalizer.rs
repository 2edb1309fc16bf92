// ============================================================
// Layer 4 — Numeric Normalizer
// ============================================================
// Standardises each rating column to zero mean, unit variance.
//
//   fit   : mean_j = Σ x_ij / n
//           var_j  = Σ (x_ij - mean_j)² / n        (population)
//   apply : (x_j - mean_j) / max(√var_j, EPSILON)
//
// The fitted statistics are data-dependent constants, so the
// whole struct is serialised into the artifact manifest.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::domain::project::{Ratings, NUM_NUMERIC};

/// Floor on the standard deviation so constant columns do not
/// divide by zero.
const EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub mean:     Vec<f32>,
    pub variance: Vec<f32>,
}

impl Normalizer {
    /// Compute per-column statistics over the training rows.
    pub fn fit(rows: &[Ratings]) -> Result<Self> {
        if rows.is_empty() {
            bail!("Cannot fit the normalizer on an empty training split");
        }
        let n = rows.len() as f64;

        // Accumulate in f64, thousands of f32 ratings lose precision fast
        let mut mean = [0.0f64; NUM_NUMERIC];
        for row in rows {
            for (m, &x) in mean.iter_mut().zip(row.as_slice()) {
                *m += x as f64;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = [0.0f64; NUM_NUMERIC];
        for row in rows {
            for ((v, &x), m) in variance.iter_mut().zip(row.as_slice()).zip(&mean) {
                let d = x as f64 - m;
                *v += d * d;
            }
        }
        variance.iter_mut().for_each(|v| *v /= n);

        tracing::debug!("Normalizer fit on {} rows: mean={:?}", rows.len(), mean);

        Ok(Self {
            mean:     mean.iter().map(|&m| m as f32).collect(),
            variance: variance.iter().map(|&v| v as f32).collect(),
        })
    }

    /// Standardise one row.
    pub fn apply(&self, ratings: &Ratings) -> [f32; NUM_NUMERIC] {
        let mut out = [0.0f32; NUM_NUMERIC];
        for (j, o) in out.iter_mut().enumerate() {
            let std = self.variance[j].sqrt().max(EPSILON);
            *o = (ratings.0[j] - self.mean[j]) / std;
        }
        out
    }

    /// Whether the statistics have the width the model expects.
    pub fn is_well_formed(&self) -> bool {
        self.mean.len() == NUM_NUMERIC && self.variance.len() == NUM_NUMERIC
    }
}
