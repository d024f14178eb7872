// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Randomly partitions records into two disjoint sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure loss/accuracy after each epoch
//
// Split ratio: 20% validation by default (configurable).
// The validation size is ceil(fraction * n), so 0.25 of 8 rows
// gives exactly 2 validation rows.
//
// Reproducibility:
//   With a seed the split is deterministic (ChaCha8). Without one
//   the RNG is seeded from OS entropy and the split differs from
//   run to run.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Build the RNG used for splitting and shuffling.
pub fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None    => ChaCha8Rng::from_entropy(),
    }
}

/// Number of validation items for `total` items.
pub fn validation_len(total: usize, val_fraction: f64) -> usize {
    let exact = total as f64 * val_fraction.clamp(0.0, 1.0);
    // float noise must not let ceil() round an exact count up
    let n = if (exact - exact.round()).abs() < 1e-9 {
        exact.round()
    } else {
        exact.ceil()
    };
    (n as usize).min(total)
}

/// Randomly shuffle `samples` and split into (train, validation).
///
/// # Arguments
/// * `samples`      - All available samples (consumed by this function)
/// * `val_fraction` - Proportion for validation, e.g. 0.2 = 20%
/// * `seed`         - Fixes the permutation when present
///
/// # Returns
/// A tuple (train_samples, val_samples); together they hold every
/// input sample exactly once.
pub fn split_train_val<T>(
    mut samples:  Vec<T>,
    val_fraction: f64,
    seed:         Option<u64>,
) -> (Vec<T>, Vec<T>) {
    let mut rng = rng_for(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = total - validation_len(total, val_fraction);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let val = samples.split_off(split_at);

    tracing::info!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.2, Some(7));
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_quarter_of_eight() {
        let items: Vec<usize> = (0..8).collect();
        let (train, val)      = split_train_val(items, 0.25, None);
        assert_eq!(train.len(), 6);
        assert_eq!(val.len(),   2);
    }

    #[test]
    fn test_rounds_up_partial_rows() {
        assert_eq!(validation_len(10, 0.2), 2);
        assert_eq!(validation_len(11, 0.2), 3);
        assert_eq!(validation_len(3, 0.0), 0);
        assert_eq!(validation_len(3, 1.0), 3);
    }

    #[test]
    fn test_disjoint_and_exhaustive() {
        let items: Vec<usize> = (0..57).collect();
        let (train, val)      = split_train_val(items, 0.2, Some(1));

        let train_set: HashSet<_> = train.iter().copied().collect();
        let val_set:   HashSet<_> = val.iter().copied().collect();
        assert!(train_set.is_disjoint(&val_set));

        let union: HashSet<_> = train_set.union(&val_set).copied().collect();
        assert_eq!(union, (0..57).collect::<HashSet<_>>());
        assert_eq!(train.len() + val.len(), 57);
    }

    #[test]
    fn test_seed_makes_split_reproducible() {
        let a = split_train_val((0..40).collect::<Vec<usize>>(), 0.2, Some(1000));
        let b = split_train_val((0..40).collect::<Vec<usize>>(), 0.2, Some(1000));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.2, None);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }
}
