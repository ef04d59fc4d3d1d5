//! Seeded batch sampling over the training set.
//!
//! Uniform without replacement: a working index permutation is shuffled and
//! the first `min(batch_size, n)` positions taken. The dataset itself is
//! never reordered or mutated; items come back as borrows in draw order.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Example;

/// Draw `min(batch_size, dataset.len())` distinct items uniformly at random.
pub fn draw_batch<'a, R: Rng>(
    dataset: &'a [Example],
    batch_size: usize,
    rng: &mut R,
) -> Vec<&'a Example> {
    let take = batch_size.min(dataset.len());
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    indices.shuffle(rng);
    indices.truncate(take);
    indices.into_iter().map(|i| &dataset[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn dataset(n: usize) -> Vec<Example> {
        (0..n)
            .map(|i| Example::new(format!("input {}", i), format!("target {}", i)))
            .collect()
    }

    #[test]
    fn batch_has_no_duplicates() {
        let data = dataset(10);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let batch = draw_batch(&data, 6, &mut rng);
            let unique: HashSet<&str> = batch.iter().map(|e| e.input_text.as_str()).collect();
            assert_eq!(unique.len(), 6);
        }
    }

    #[test]
    fn oversized_batch_clamps_to_dataset() {
        let data = dataset(3);
        let mut rng = StdRng::seed_from_u64(42);
        let batch = draw_batch(&data, 100, &mut rng);
        assert_eq!(batch.len(), 3);
        let unique: HashSet<&str> = batch.iter().map(|e| e.input_text.as_str()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn empty_dataset_yields_empty_batch() {
        let data = dataset(0);
        let mut rng = StdRng::seed_from_u64(42);
        assert!(draw_batch(&data, 8, &mut rng).is_empty());
    }

    #[test]
    fn same_seed_same_batches() {
        let data = dataset(12);
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        for _ in 0..5 {
            let a: Vec<&str> = draw_batch(&data, 4, &mut rng_a)
                .iter()
                .map(|e| e.input_text.as_str())
                .collect();
            let b: Vec<&str> = draw_batch(&data, 4, &mut rng_b)
                .iter()
                .map(|e| e.input_text.as_str())
                .collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn dataset_is_untouched_by_sampling() {
        let data = dataset(5);
        let snapshot = data.clone();
        let mut rng = StdRng::seed_from_u64(42);
        let _ = draw_batch(&data, 3, &mut rng);
        assert_eq!(data, snapshot);
    }
}
