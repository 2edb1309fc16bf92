// ============================================================
// Layer 6 — Text Vectorizer
// ============================================================
// Turns the concatenated project text into a fixed-length
// sequence of integer token ids, backed by a HuggingFace
// `tokenizers` WordLevel model.
//
// Fit:
//   lowercase → split on whitespace → drop punctuation
//   → count words → keep the most frequent
//
// Vocabulary layout:
//   0  [PAD]   padding
//   1  [UNK]   out-of-vocabulary
//   2… words, most frequent first, ties alphabetical
//   total size ≤ max_tokens
//
// Apply: encode, truncate to `sequence_length`, right-pad with 0.
//
// Words are counted by running the same normalizer and
// pre-tokenizer the final tokenizer uses, so every fitted word is
// reachable at encode time. The tokenizer JSON is written by hand
// rather than through the tokenizers trainer API, whose
// Trainer::Model bound does not line up with ModelWrapper for
// WordLevel.

use anyhow::{anyhow, bail, Context, Result};
use std::{collections::HashMap, path::Path, str::FromStr};
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
    Tokenizer,
};

pub const PAD_ID: u32 = 0;
pub const OOV_ID: u32 = 1;

pub const DEFAULT_MAX_TOKENS: usize = 5000;
pub const DEFAULT_SEQUENCE_LENGTH: usize = 100;

const TOKENIZER_FILE: &str = "tokenizer.json";

#[derive(Debug)]
pub struct TextVectorizer {
    tokenizer:       Tokenizer,
    sequence_length: usize,
}

impl TextVectorizer {
    /// Learn a vocabulary of at most `max_tokens` ids (padding and
    /// OOV included) from the training texts.
    pub fn fit(texts: &[String], max_tokens: usize, sequence_length: usize) -> Result<Self> {
        if max_tokens < 2 {
            bail!("max_tokens must leave room for [PAD] and [UNK], got {max_tokens}");
        }
        if sequence_length == 0 {
            bail!("sequence_length must be positive");
        }

        // ── Count word frequencies with the tokenizer's own pipeline ──────────
        let mut vocab = serde_json::Map::new();
        vocab.insert("[PAD]".to_string(), serde_json::json!(PAD_ID));
        vocab.insert("[UNK]".to_string(), serde_json::json!(OOV_ID));

        let scaffold = build_tokenizer(vocab.clone())?;
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in pipeline_words(&scaffold, text)? {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(max_tokens - 2);

        // ── Build the WordLevel vocab ─────────────────────────────────────────
        for (i, (word, _)) in words.iter().enumerate() {
            vocab.insert(word.clone(), serde_json::json!(i + 2));
        }
        let tokenizer = build_tokenizer(vocab)?;

        tracing::info!(
            "Text vectorizer fit on {} texts: vocab_size={}, sequence_length={}",
            texts.len(),
            words.len() + 2,
            sequence_length
        );

        Ok(Self { tokenizer, sequence_length })
    }

    /// Number of ids the embedding table must cover.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Map text to exactly `sequence_length` token ids.
    pub fn apply(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self.tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let mut ids: Vec<u32> = enc.get_ids().to_vec();
        ids.truncate(self.sequence_length);
        ids.resize(self.sequence_length, PAD_ID);
        Ok(ids)
    }

    /// Write the vocabulary as `tokenizer.json` inside `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(TOKENIZER_FILE);
        self.tokenizer
            .save(&path, true)
            .map_err(|e| anyhow::anyhow!("Cannot write tokenizer to '{}': {e}", path.display()))?;
        tracing::debug!("Saved tokenizer to '{}'", path.display());
        Ok(())
    }

    /// Load a vocabulary previously written by `save`.
    pub fn load(dir: &Path, sequence_length: usize) -> Result<Self> {
        let path = dir.join(TOKENIZER_FILE);
        if !path.exists() {
            bail!("Artifact has no '{}' but the model expects text input", path.display());
        }
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))
            .with_context(|| "The artifact may be incomplete; retrain the text model")?;
        Ok(Self { tokenizer, sequence_length })
    }
}

/// WordLevel tokenizer over `vocab`: lowercase, split on whitespace,
/// drop punctuation.
fn build_tokenizer(vocab: serde_json::Map<String, serde_json::Value>) -> Result<Tokenizer> {
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": {
            "type": "Sequence",
            "pretokenizers": [
                { "type": "WhitespaceSplit" },
                { "type": "Punctuation", "behavior": "Removed" }
            ]
        },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| anyhow!("Cannot build tokenizer: {e}"))
}

/// The words `tokenizer` would look up for `text`, before the
/// vocabulary is consulted.
fn pipeline_words(tokenizer: &Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut normalized = NormalizedString::from(text);
    if let Some(n) = tokenizer.get_normalizer() {
        n.normalize(&mut normalized)
            .map_err(|e| anyhow!("Normalisation error: {e}"))?;
    }

    let mut pre = PreTokenizedString::from(normalized);
    if let Some(p) = tokenizer.get_pre_tokenizer() {
        p.pre_tokenize(&mut pre)
            .map_err(|e| anyhow!("Pre-tokenisation error: {e}"))?;
    }

    Ok(pre
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .filter(|w| !w.is_empty())
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "Drone Flight Control autonomous quadrotor".to_string(),
            "Bridge steel-truss, bridge!".to_string(),
        ]
    }

    #[test]
    fn test_pipeline_words_strip_punctuation() {
        let v = TextVectorizer::fit(&corpus(), DEFAULT_MAX_TOKENS, 4).unwrap();
        assert_eq!(
            pipeline_words(&v.tokenizer, "Bridge steel-truss, BRIDGE!").unwrap(),
            vec!["bridge", "steel", "truss", "bridge"]
        );
        assert!(pipeline_words(&v.tokenizer, "  ,;  ").unwrap().is_empty());
    }

    #[test]
    fn test_unicode_punctuation_words_are_reachable() {
        let texts = vec!["sensor•array sensor•array".to_string(), "valve·seat".to_string()];
        let v     = TextVectorizer::fit(&texts, 100, 4).unwrap();

        // [PAD], [UNK], array, seat, sensor, valve
        assert_eq!(v.vocab_size(), 6);
        let ids = v.apply("sensor•array").unwrap();
        assert!(ids[..2].iter().all(|&id| id > OOV_ID), "got {ids:?}");
        assert_eq!(&ids[2..], &[PAD_ID, PAD_ID]);
        assert!(v.apply("valve·seat").unwrap()[..2].iter().all(|&id| id > OOV_ID));
    }

    #[test]
    fn test_most_frequent_word_gets_first_id() {
        let v   = TextVectorizer::fit(&corpus(), DEFAULT_MAX_TOKENS, 8).unwrap();
        let ids = v.apply("bridge").unwrap();
        assert_eq!(ids[0], 2);
        assert_eq!(v.vocab_size(), 2 + 8);
    }

    #[test]
    fn test_output_is_fixed_length() {
        let v = TextVectorizer::fit(&corpus(), DEFAULT_MAX_TOKENS, DEFAULT_SEQUENCE_LENGTH).unwrap();

        let short = v.apply("drone").unwrap();
        assert_eq!(short.len(), DEFAULT_SEQUENCE_LENGTH);
        assert!(short[1..].iter().all(|&id| id == PAD_ID));

        let long_text = "drone ".repeat(500);
        assert_eq!(v.apply(&long_text).unwrap().len(), DEFAULT_SEQUENCE_LENGTH);

        assert!(v.apply("").unwrap().iter().all(|&id| id == PAD_ID));
    }

    #[test]
    fn test_unknown_words_map_to_oov() {
        let v   = TextVectorizer::fit(&corpus(), DEFAULT_MAX_TOKENS, 4).unwrap();
        let ids = v.apply("Submarine drone").unwrap();
        assert_eq!(ids[0], OOV_ID);
        assert!(ids[1] > OOV_ID);
    }

    #[test]
    fn test_max_tokens_caps_vocabulary() {
        let v = TextVectorizer::fit(&corpus(), 4, 4).unwrap();
        assert_eq!(v.vocab_size(), 4);
    }

    #[test]
    fn test_save_and_load_keep_ids() {
        let dir = tempfile::tempdir().unwrap();
        let v   = TextVectorizer::fit(&corpus(), DEFAULT_MAX_TOKENS, 6).unwrap();
        v.save(dir.path()).unwrap();

        let loaded = TextVectorizer::load(dir.path(), 6).unwrap();
        assert_eq!(loaded.vocab_size(), v.vocab_size());
        assert_eq!(
            loaded.apply("autonomous bridge drone").unwrap(),
            v.apply("autonomous bridge drone").unwrap()
        );
    }
}
