//! Per-stage density-ratio surrogate over observed trial scores.
//!
//! A lightweight Tree-Parzen estimator: each stage's observed scores are
//! split into a "good" and a "bad" population around their running median,
//! and the acquisition signal for mutating that stage next is the ratio of
//! Parzen-window densities `good(x) / (bad(x) + ε)` evaluated at the most
//! recent score. Stages whose good population concentrates near the current
//! score look promising.
//!
//! | Piece | Choice |
//! |---|---|
//! | Split rule | score ≥ running median → good (ties go to good) |
//! | Kernel | Gaussian, Silverman-style bandwidth `1.06·σ·n^(-1/5)` |
//! | Bandwidth floor | `1e-3` additive, keeps degenerate populations finite |
//! | Spread | standard deviation about the **median**, not the mean |
//!
//! The running-median split keeps the two populations roughly balanced
//! without a quantile hyperparameter. The median-centroid standard deviation
//! keeps the bandwidth steady under the skewed score distributions early
//! trials produce.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Denominator guard for the density ratio.
const RATIO_EPSILON: f64 = 1e-6;

/// Additive floor keeping the kernel bandwidth positive for zero-spread
/// populations (a constant evaluator would otherwise collapse σ to 0).
const BANDWIDTH_FLOOR: f64 = 1e-3;

/// Density-ratio estimator for one pipeline stage.
///
/// Grows monotonically: every observed score lands in exactly one of the two
/// populations and is never moved or dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSurrogate {
    good: Vec<f64>,
    bad: Vec<f64>,
}

impl StageSurrogate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores classified as good so far, insertion order.
    pub fn good(&self) -> &[f64] {
        &self.good
    }

    /// Scores classified as bad so far, insertion order.
    pub fn bad(&self) -> &[f64] {
        &self.bad
    }

    /// Total number of scores observed.
    pub fn observations(&self) -> usize {
        self.good.len() + self.bad.len()
    }

    /// Record a score, classifying it against the running median of every
    /// previously observed score for this stage. The first observation, or
    /// any observation made while the median is undefined, goes to good.
    pub fn update(&mut self, score: f64) {
        let union: Vec<f64> = self.good.iter().chain(self.bad.iter()).copied().collect();
        match median(&union) {
            Some(m) if !m.is_nan() => {
                if score >= m {
                    self.good.push(score);
                } else {
                    self.bad.push(score);
                }
            }
            _ => self.good.push(score),
        }
    }

    /// Preference signal for mutating this stage next, evaluated at `score`.
    /// Larger means more promising.
    ///
    /// Until both populations are non-empty this is pure exploration: a
    /// uniform draw in [0, 1). After that, the TPE density ratio. Callers
    /// must treat a NaN return as zero preference; a NaN can only arise from
    /// a population polluted by non-finite scores.
    pub fn utility<R: Rng>(&self, score: f64, rng: &mut R) -> f64 {
        if self.good.is_empty() || self.bad.is_empty() {
            return rng.gen::<f64>();
        }
        parzen(score, &self.good) / (parzen(score, &self.bad) + RATIO_EPSILON)
    }
}

/// Gaussian kernel density estimate of `arr` at `x`.
///
/// One kernel per observation, mean `arr[i]`, shared bandwidth `h`, averaged
/// over the population. `arr` must be non-empty.
fn parzen(x: f64, arr: &[f64]) -> f64 {
    let n = arr.len() as f64;
    let h = BANDWIDTH_FLOOR + 1.06 * stddev_about_median(arr) * n.powf(-0.2);
    let norm = 1.0 / (h * (2.0 * std::f64::consts::PI).sqrt());
    arr.iter()
        .map(|&mu| {
            let z = (x - mu) / h;
            norm * (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        / n
}

/// Standard deviation of `arr` measured about its median.
fn stddev_about_median(arr: &[f64]) -> f64 {
    let Some(center) = median(arr) else {
        return 0.0;
    };
    let variance = arr.iter().map(|v| (v - center).powi(2)).sum::<f64>() / arr.len() as f64;
    variance.sqrt()
}

/// Median of the values; `None` when empty. Even-sized inputs take the mean
/// of the two middle elements. Ordering is total, so non-finite values sort
/// mechanically instead of poisoning the comparison.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
