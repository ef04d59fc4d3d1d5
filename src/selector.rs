//! Stage selection: which pipeline stage to mutate next.
//!
//! Two-phase policy:
//!
//! 1. **Coverage**: until every declared stage has been executed at least
//!    once, pick uniformly among the unexecuted stages. Every stage gets a
//!    trial before the surrogates have any say.
//! 2. **Credit assignment**: score each stage's surrogate at the most recent
//!    trial's score and sample a stage with probability proportional to its
//!    utility. A degenerate total (zero or non-finite) falls back to uniform
//!    selection over all stages.
//!
//! All randomness comes through the caller's seeded generator, and utilities
//! are evaluated in declared stage order, so the draw sequence (and with it
//! the whole run) is reproducible from the seed.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::surrogate::StageSurrogate;

/// Pick the next stage to mutate. `stages` must be non-empty (validated
/// before the loop starts); `last_score` is the most recent trial's score,
/// or 0 when there is none.
pub fn pick_stage<R: Rng>(
    stages: &[String],
    executed: &HashSet<String>,
    surrogates: &HashMap<String, StageSurrogate>,
    last_score: f64,
    rng: &mut R,
) -> String {
    let unexecuted: Vec<&String> = stages.iter().filter(|s| !executed.contains(*s)).collect();
    if !unexecuted.is_empty() {
        return unexecuted[rng.gen_range(0..unexecuted.len())].clone();
    }

    // Declared order keeps the RNG draw sequence stable across runs.
    let utilities: Vec<f64> = stages
        .iter()
        .map(|stage| {
            let u = surrogates
                .get(stage)
                .map(|s| s.utility(last_score, rng))
                .unwrap_or(0.0);
            // NaN from a polluted population counts as zero preference.
            if u.is_finite() { u } else { 0.0 }
        })
        .collect();

    let total: f64 = utilities.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return stages[rng.gen_range(0..stages.len())].clone();
    }

    // Cumulative-weight walk over the utilities.
    let mut pick = rng.gen::<f64>() * total;
    for (stage, weight) in stages.iter().zip(&utilities) {
        pick -= weight;
        if pick <= 0.0 {
            return stage.clone();
        }
    }
    stages[stages.len() - 1].clone()
}
