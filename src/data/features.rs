// ============================================================
// Layer 4 — Feature Extraction
// ============================================================
// One code path from a project to model-ready features, shared
// by training and inference:
//
//   ProjectInput ──▶ numeric_vector ──▶ Normalizer ──▶ [f32; 11]
//        │
//        └──▶ ProjectText::combined ──▶ TextVectorizer ──▶ [u32; seq_len]
//
// Training and serving must go through the same Featurizer,
// built from the same fitted adapters, or predictions are noise.

use anyhow::{bail, Result};

use crate::data::{dataset::EngSample, normalizer::Normalizer};
use crate::domain::project::{FeatureSchema, ProjectInput, ProjectRecord, NUM_NUMERIC};
use crate::infra::vectorizer::TextVectorizer;

/// Raw ratings in model input order. Always NUM_NUMERIC wide.
pub fn numeric_vector(input: &ProjectInput) -> [f32; NUM_NUMERIC] {
    input.ratings.0
}

/// Features of one project after the fitted adapters ran.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInput {
    pub numeric: [f32; NUM_NUMERIC],
    pub tokens:  Option<Vec<u32>>,
}

/// The fitted adapters, applied together.
pub struct Featurizer {
    normalizer: Normalizer,
    vectorizer: Option<TextVectorizer>,
}

impl Featurizer {
    pub fn new(normalizer: Normalizer, vectorizer: Option<TextVectorizer>) -> Self {
        Self { normalizer, vectorizer }
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema { uses_text: self.vectorizer.is_some() }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn vectorizer(&self) -> Option<&TextVectorizer> {
        self.vectorizer.as_ref()
    }

    /// Standardise the ratings and, for text models, vectorise the
    /// concatenated text. Text supplied to a numeric-only model is
    /// ignored.
    pub fn encode(&self, input: &ProjectInput) -> Result<EncodedInput> {
        let numeric = self.normalizer.apply(&input.ratings);

        let tokens = match (&self.vectorizer, &input.text) {
            (Some(v), Some(text)) => Some(v.apply(&text.combined())?),
            (Some(_), None)       => bail!("This model requires ProjectName, PrimaryTechnology and ProjectDescription"),
            (None, _)             => None,
        };

        Ok(EncodedInput { numeric, tokens })
    }

    /// Encode a labelled record into a training sample.
    pub fn sample(&self, record: &ProjectRecord) -> Result<EngSample> {
        let encoded = self.encode(&record.input)?;
        Ok(EngSample {
            numeric:       encoded.numeric.to_vec(),
            tokens:        encoded.tokens,
            primary_field: record.labels.primary_field.index(),
            contributions: record.labels.contributions.to_vec(),
            complexity:    record.labels.complexity,
        })
    }
}
