//! Collaborator contracts: the optimizer's boundary with the outside world.
//!
//! Five single-operation traits. The optimizer never knows how data is
//! loaded, how the staged program executes, how outputs are judged, how new
//! instructions get drafted, or where the winning prompt set goes. It only
//! drives the loop:
//!
//! | Capability | Invoked | Typical adapter |
//! |---|---|---|
//! | [`DataLoader`] | once, before the first trial | file / HF dataset reader |
//! | [`Runner`] | once per item per trial | pipeline executor calling an LLM |
//! | [`Evaluator`] | once per trial | exact-match, cosine, LLM-as-judge |
//! | [`Proposer`] | once per trial | LLM drafting a new instruction |
//! | [`Outputter`] | once, at termination | serializer, stdout printer |
//!
//! Every method takes `&mut self` so stateful adapters (API clients, retry
//! wrappers, counters in test doubles) need no interior mutability. Errors
//! cross the boundary as `anyhow::Error` and propagate out of the optimizer
//! unchanged; there are no retries and no partial commits.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::{Example, Prompt, PromptSet};

/// Loads the training set. Invoked exactly once per run.
pub trait DataLoader {
    fn load(&mut self) -> Result<Vec<Example>>;
}

/// Executes the staged program on one item under a candidate prompt set.
///
/// The output is opaque to the optimizer; only the evaluator interprets it.
/// May be deterministic or stochastic.
pub trait Runner {
    type Output;

    fn run(&mut self, item: &Example, prompts: &PromptSet) -> Result<Self::Output>;
}

/// Scores one batch of runner outputs. Higher is better.
///
/// The contract is to return a finite real for a possibly-empty batch. A
/// non-finite return is recorded in the ledger but never becomes the best.
pub trait Evaluator<O> {
    fn evaluate(&mut self, outputs: &[O]) -> Result<f64>;
}

/// Drafts a replacement prompt for one stage, grounded in past attempts.
///
/// Contract: with empty `past_attempts` the proposer should return the
/// stage's initial prompt verbatim. Duplicate returns are permitted.
pub trait Proposer {
    fn propose(&mut self, ctx: &ProposerContext) -> Result<Prompt>;
}

/// Receives the best prompt set exactly once, at termination.
pub trait Outputter {
    fn deliver(&mut self, best: &PromptSet) -> Result<()>;
}

/// A past attempt at one stage: the prompt the stage carried in some earlier
/// trial, paired with that trial's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAttempt {
    pub prompt: Prompt,
    pub score: f64,
}

/// Everything a proposer sees when drafting a stage's next prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposerContext {
    /// The stage being proposed for.
    pub stage_name: String,
    /// Short textual preview of the dataset: the first three examples,
    /// serialized one per line.
    pub data_summary: String,
    /// `"Program stages: "` + comma-joined stage names, declared order.
    pub program_summary: String,
    /// This stage's prompts across past trials with their scores, oldest
    /// first.
    pub past_attempts: Vec<StageAttempt>,
    /// The normalized initial prompt set.
    pub initial_prompts: PromptSet,
}
