//! The optimization loop: sequential trials with per-stage credit assignment.
//!
//! ```text
//! Selector ──→ Assembler(Proposer) ──→ Runner × batch ──→ Evaluator
//!    ↑                                                       │
//!    └── Surrogate update ← History append ← Trial ←─── score
//! ```
//!
//! Trials are strictly sequential: stage selection for trial N+1 reads the
//! surrogate densities and score produced by trial N, so nothing here
//! parallelizes. Within a trial, the ledger append, the surrogate update,
//! and the best update happen in that order, and a failed collaborator call
//! aborts the trial before any of the three. The ledger never holds a
//! partially-built trial.
//!
//! Collaborator failures propagate out of [`Optimizer::optimize`] unwrapped;
//! there are no retries. A non-finite evaluator score is recorded in the
//! ledger but can never displace the incumbent best (NaN loses every strict
//! comparison).

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assembler;
use crate::collaborators::{DataLoader, Evaluator, Outputter, Proposer, Runner};
use crate::history::History;
use crate::progress::LiveProgress;
use crate::sampler;
use crate::selector;
use crate::surrogate::StageSurrogate;
use crate::types::{Example, PromptSet, Trial};

/// Knobs for one optimization run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of trials.
    pub max_iterations: usize,
    /// Items drawn per trial. Clamped to the dataset size; must be ≥ 1.
    pub batch_size: usize,
    /// PRNG seed. `None` seeds from the wall clock.
    pub seed: Option<u64>,
    /// Stop as soon as a trial scores at or above this.
    pub early_stop_threshold: f64,
    /// Show the live sparkline display while running.
    pub progress: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            batch_size: 8,
            seed: None,
            early_stop_threshold: 0.95,
            progress: false,
        }
    }
}

/// Sequential prompt optimizer over a declared set of pipeline stages.
///
/// Owns the trial ledger, the per-stage surrogates, the incumbent best, and
/// the seeded PRNG for the duration of a run; the five collaborators are
/// injected once at construction. The ledger and surrogates stay readable
/// after [`optimize`](Self::optimize) returns, so callers can inspect (or
/// plot) how the run went.
pub struct Optimizer<L, R, E, P, U> {
    stages: Vec<String>,
    loader: L,
    runner: R,
    evaluator: E,
    proposer: P,
    outputter: U,
    dataset: Vec<Example>,
    history: History,
    surrogates: HashMap<String, StageSurrogate>,
    executed: HashSet<String>,
}

impl<L, R, E, P, U> Optimizer<L, R, E, P, U>
where
    L: DataLoader,
    R: Runner,
    E: Evaluator<R::Output>,
    P: Proposer,
    U: Outputter,
{
    pub fn new(
        stages: Vec<String>,
        loader: L,
        runner: R,
        evaluator: E,
        proposer: P,
        outputter: U,
    ) -> Self {
        Self {
            stages,
            loader,
            runner,
            evaluator,
            proposer,
            outputter,
            dataset: Vec::new(),
            history: History::new(),
            surrogates: HashMap::new(),
            executed: HashSet::new(),
        }
    }

    /// The trial ledger for the most recent run.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// A stage's surrogate from the most recent run.
    pub fn surrogate(&self, stage: &str) -> Option<&StageSurrogate> {
        self.surrogates.get(stage)
    }

    /// Stages that have been mutated at least once in the most recent run.
    pub fn executed_stages(&self) -> &HashSet<String> {
        &self.executed
    }

    /// The dataset loaded for the most recent run.
    pub fn dataset(&self) -> &[Example] {
        &self.dataset
    }

    /// Run the optimization loop and return the best prompt set found.
    ///
    /// With `max_iterations = 0` the loop never executes and the
    /// (normalized) initial set is delivered and returned as-is.
    pub fn optimize(&mut self, initial_prompts: PromptSet, opts: &Options) -> Result<PromptSet> {
        self.validate(&initial_prompts, opts)?;

        // INIT
        let seed = opts.seed.unwrap_or_else(wall_clock_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        self.history = History::new();
        self.surrogates = self
            .stages
            .iter()
            .map(|s| (s.clone(), StageSurrogate::new()))
            .collect();
        self.executed = HashSet::new();

        let initial = initial_prompts;
        // Sentinel incumbent: the initial set at -∞, displaced by the first
        // trial with a comparable score.
        let mut best = Trial {
            iteration: 0,
            prompts: initial.clone(),
            score: f64::NEG_INFINITY,
        };
        let mut progress = LiveProgress::new();

        self.dataset = self.loader.load()?;

        // LOOP
        for iter in 0..opts.max_iterations {
            let last_score = self
                .history
                .trials()
                .last()
                .map(|t| t.score)
                .unwrap_or(0.0);
            let stage = selector::pick_stage(
                &self.stages,
                &self.executed,
                &self.surrogates,
                last_score,
                &mut rng,
            );
            self.executed.insert(stage.clone());

            let candidate = assembler::assemble_candidate(
                &mut self.proposer,
                &stage,
                &best.prompts,
                &initial,
                &self.stages,
                &self.dataset,
                &self.history,
            )?;

            let batch = sampler::draw_batch(&self.dataset, opts.batch_size, &mut rng);
            let mut outputs = Vec::with_capacity(batch.len());
            for item in batch {
                outputs.push(self.runner.run(item, &candidate)?);
            }
            let score = self.evaluator.evaluate(&outputs)?;

            let trial = Trial {
                iteration: iter,
                prompts: candidate,
                score,
            };
            self.history.append(trial.clone());
            if let Some(surrogate) = self.surrogates.get_mut(&stage) {
                surrogate.update(score);
            }
            if score > best.score {
                let previous = best.score;
                best = trial;
                announce_improvement(iter, previous, score);
            }

            if opts.progress {
                progress.record(score, best.score, &stage);
                progress.display(iter + 1, opts.max_iterations);
            }

            if score >= opts.early_stop_threshold {
                break;
            }
        }

        if opts.progress {
            progress.final_summary();
        }

        // TERMINATED
        self.outputter.deliver(&best.prompts)?;
        Ok(best.prompts)
    }

    fn validate(&self, initial: &PromptSet, opts: &Options) -> Result<()> {
        if self.stages.is_empty() {
            bail!("configuration error: no stages declared");
        }
        if opts.batch_size < 1 {
            bail!("configuration error: batch_size must be >= 1");
        }
        for stage in &self.stages {
            if initial.get(stage).is_none() {
                bail!(
                    "configuration error: initial prompts missing declared stage '{}'",
                    stage
                );
            }
        }
        for stage in initial.stages() {
            if !self.stages.iter().any(|s| s == stage) {
                bail!(
                    "configuration error: initial prompts name undeclared stage '{}'",
                    stage
                );
            }
        }
        Ok(())
    }
}

/// The iteration-improvement notice, the only thing the loop prints on its
/// own.
fn announce_improvement(iteration: usize, previous: f64, score: f64) {
    if previous == f64::NEG_INFINITY {
        println!(
            "  {} trial {:>3}: score {:.4}",
            "improved".green().bold(),
            iteration,
            score
        );
    } else {
        println!(
            "  {} trial {:>3}: score {:.4} → {:.4}",
            "improved".green().bold(),
            iteration,
            previous,
            score
        );
    }
}

/// Wall-clock seed for runs that don't pin one.
fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
