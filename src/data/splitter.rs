// ============================================================
// Layer 4 — Train / Test / Validation Splitting
// ============================================================
// Two splits happen before training:
//
//   split_train_test      seeded shuffle, then the first
//                         ceil(n × test_fraction) rows become the
//                         held-out test set
//   split_validation_tail no shuffle; the LAST validation_fraction
//                         of the train split is reserved for
//                         per-epoch validation
//
// The seed makes the test split reproducible across runs.
//
// Reference: rand crate documentation (SliceRandom, StdRng)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Seeded shuffle followed by a (train, test) split.
pub fn split_train_test<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total  = samples.len();
    let n_test = ((total as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(total);

    // The shuffled order is already random, take the test rows off the front
    let train = samples.split_off(n_test);
    let test  = samples;

    tracing::debug!(
        "Test split (seed={}): {} train, {} test",
        seed,
        train.len(),
        test.len()
    );

    (train, test)
}

/// Reserve the tail of `samples` for validation without shuffling.
pub fn split_validation_tail<T>(mut samples: Vec<T>, validation_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let keep     = (total as f64) * (1.0 - validation_fraction.clamp(0.0, 1.0));
    let split_at = (keep.floor() as usize).min(total);

    let val = samples.split_off(split_at);
    (samples, val)
}
