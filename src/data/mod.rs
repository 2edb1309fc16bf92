// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV file and tensor batches:
//
//   training CSV
//       │
//       ▼
//   CsvLoader         → ProjectRecords
//       │
//       ▼
//   splitter          → train / test (seeded), validation tail
//       │
//       ▼
//   Normalizer (+ TextVectorizer from infra), fit on train only
//       │
//       ▼
//   Featurizer        → EngSample per record
//       │
//       ▼
//   EngDataset        → Burn InMemDataset
//       │
//       ▼
//   EngBatcher        → EngBatch tensors for the DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads labelled project rows from CSV
pub mod loader;

/// Per-column standardisation fit on the train split
pub mod normalizer;

/// Numeric/text feature extraction shared by training and serving
pub mod features;

/// Encoded samples in Burn's InMemDataset
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/test split and validation tail
pub mod splitter;
