//! Append-only trial ledger with derived views.
//!
//! Trials are recorded in iteration order and never mutated or removed.
//! Every view (the best trial, a stage's attempt history) is derived by
//! scanning, which keeps the ledger itself a dumb vector an observer can
//! snapshot at any point: after `N` iterations it holds exactly `N` trials.

use serde::{Deserialize, Serialize};

use crate::collaborators::StageAttempt;
use crate::types::Trial;

/// The trial ledger for one optimization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    trials: Vec<Trial>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished trial. Appends only; nothing is ever rewritten.
    pub fn append(&mut self, trial: Trial) {
        self.trials.push(trial);
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// All trials, iteration order.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Highest-scoring trial, earliest on ties. `None` while the ledger is
    /// empty or when every recorded score is NaN.
    pub fn best(&self) -> Option<&Trial> {
        let mut best: Option<&Trial> = None;
        for trial in &self.trials {
            if trial.score.is_nan() {
                continue;
            }
            match best {
                None => best = Some(trial),
                Some(b) if trial.score > b.score => best = Some(trial),
                _ => {}
            }
        }
        best
    }

    /// The prompt `stage` carried in each past trial, oldest first, paired
    /// with that trial's score.
    pub fn attempts_for(&self, stage: &str) -> Vec<StageAttempt> {
        self.trials
            .iter()
            .filter_map(|trial| {
                trial.prompts.get(stage).map(|prompt| StageAttempt {
                    prompt: prompt.clone(),
                    score: trial.score,
                })
            })
            .collect()
    }
}
