// ============================================================
// Layer 3 — Prediction Domain Type
// ============================================================
// The three model outputs for one project, shaped exactly like
// the JSON body returned by POST /predict_eng.

use serde::{Deserialize, Serialize};

use crate::domain::discipline::Discipline;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Softmax over the ten disciplines, Discipline::ALL order.
    pub primary_field_probs: Vec<f32>,

    /// Raw linear outputs of the contributions head. These are NOT
    /// rescaled to sum to 100.
    pub contributions: Vec<f32>,

    pub complexity: f32,

    /// Discipline with the highest probability.
    pub primary_field: Discipline,
}

impl Prediction {
    pub fn new(primary_field_probs: Vec<f32>, contributions: Vec<f32>, complexity: f32) -> anyhow::Result<Self> {
        let primary_field = Discipline::argmax(&primary_field_probs)
            .ok_or_else(|| anyhow::anyhow!("Model produced no primary-field scores"))?;
        Ok(Self { primary_field_probs, contributions, complexity, primary_field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_with_expected_keys() {
        let mut probs = vec![0.0f32; 10];
        probs[4] = 1.0;
        let p = Prediction::new(probs, vec![10.0; 10], 3.5).unwrap();
        let v = serde_json::to_value(&p).unwrap();

        assert_eq!(v["primary_field_probs"].as_array().unwrap().len(), 10);
        assert_eq!(v["contributions"].as_array().unwrap().len(), 10);
        assert_eq!(v["complexity"].as_f64().unwrap(), 3.5);
        assert_eq!(v["primary_field"], "Computer");
    }

    #[test]
    fn test_empty_scores_are_rejected() {
        assert!(Prediction::new(Vec::new(), Vec::new(), 0.0).is_err());
    }
}
