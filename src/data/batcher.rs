// ============================================================
// Layer 4 — Project Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N EngSamples into
// the tensors one forward pass consumes.
//
//   numeric       [N, 11]        Float
//   tokens        [N, seq_len]   Int     (text models only)
//   primary_field [N]            Int     class index
//   contributions [N, 10]        Float
//   complexity    [N, 1]         Float
//
// Every sample is produced by the same Featurizer, so either all
// carry tokens or none do, and all token rows share one length.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::EngSample;

#[derive(Debug, Clone)]
pub struct EngBatch<B: Backend> {
    pub numeric:       Tensor<B, 2>,
    pub tokens:        Option<Tensor<B, 2, Int>>,
    pub primary_field: Tensor<B, 1, Int>,
    pub contributions: Tensor<B, 2>,
    pub complexity:    Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct EngBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> EngBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EngSample, EngBatch<B>> for EngBatcher<B> {
    fn batch(&self, items: Vec<EngSample>) -> EngBatch<B> {
        let batch_size = items.len();
        let n_numeric  = items[0].numeric.len();
        let n_contrib  = items[0].contributions.len();

        let numeric_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.numeric.iter().copied())
            .collect();
        let numeric = Tensor::<B, 1>::from_floats(numeric_flat.as_slice(), &self.device)
            .reshape([batch_size, n_numeric]);

        // ── Token ids, only when the text branch is in use ────────────────────
        let tokens = items[0].tokens.as_ref().map(|first| {
            let seq_len = first.len();
            let ids_flat: Vec<i32> = items
                .iter()
                .flat_map(|s| {
                    s.tokens
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .map(|&id| id as i32)
                })
                .collect();
            Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
                .reshape([batch_size, seq_len])
        });

        let labels: Vec<i32> = items.iter().map(|s| s.primary_field as i32).collect();
        let primary_field = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        let contrib_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.contributions.iter().copied())
            .collect();
        let contributions = Tensor::<B, 1>::from_floats(contrib_flat.as_slice(), &self.device)
            .reshape([batch_size, n_contrib]);

        let complexity: Vec<f32> = items.iter().map(|s| s.complexity).collect();
        let complexity = Tensor::<B, 1>::from_floats(complexity.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        EngBatch { numeric, tokens, primary_field, contributions, complexity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn sample(label: usize, tokens: Option<Vec<u32>>) -> EngSample {
        EngSample {
            numeric:       vec![0.5; 11],
            tokens,
            primary_field: label,
            contributions: vec![10.0; 10],
            complexity:    3.0,
        }
    }

    #[test]
    fn test_batch_shapes_numeric_only() {
        let batcher = EngBatcher::<NdArray>::new(Default::default());
        let batch   = batcher.batch(vec![sample(0, None), sample(3, None), sample(9, None)]);

        assert_eq!(batch.numeric.dims(), [3, 11]);
        assert!(batch.tokens.is_none());
        assert_eq!(batch.primary_field.dims(), [3]);
        assert_eq!(batch.contributions.dims(), [3, 10]);
        assert_eq!(batch.complexity.dims(), [3, 1]);
    }

    #[test]
    fn test_batch_shapes_with_tokens() {
        let batcher = EngBatcher::<NdArray>::new(Default::default());
        let batch   = batcher.batch(vec![
            sample(1, Some(vec![2, 3, 0, 0])),
            sample(2, Some(vec![4, 0, 0, 0])),
        ]);

        assert_eq!(batch.tokens.unwrap().dims(), [2, 4]);
    }
}
