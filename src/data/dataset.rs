use burn::data::dataset::InMemDataset;
use serde::{Deserialize, Serialize};

/// One fully encoded training sample.
/// `numeric` is already standardised; `tokens` is present only
/// for text models and is always `sequence_length` long.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngSample {
    pub numeric:       Vec<f32>,
    pub tokens:        Option<Vec<u32>>,
    pub primary_field: usize,
    pub contributions: Vec<f32>,
    pub complexity:    f32,
}

/// Encoded samples held in memory for the DataLoader.
pub type EngDataset = InMemDataset<EngSample>;
