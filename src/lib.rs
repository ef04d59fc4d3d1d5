//! promptune - sequential prompt optimization for multi-stage LLM programs
//!
//! Given a labeled training set, a runner that executes a staged LLM
//! program, a scoring function, and a proposer that drafts new instructions,
//! promptune searches for the per-stage prompt set that maximizes the score
//! on sampled batches.
//!
//! # Architecture
//!
//! ```text
//! Stage Selector → Candidate Assembler → Runner × batch → Evaluator
//!       ↑                 ↓ Proposer                          ↓
//!  TPE Surrogates ← Surrogate update ← History append ← Trial{score}
//! ```
//!
//! One trial per iteration, strictly sequential: the selector's
//! explore/exploit decision for trial N+1 reads the densities updated by
//! trial N. Credit assignment is per-stage: each stage owns a lightweight
//! Tree-Parzen surrogate splitting its observed scores into good/bad
//! populations around the running median.
//!
//! # Boundary
//!
//! The crate is a pure library. Data loading, program execution, scoring,
//! prompt drafting, and result delivery are injected through one-method
//! traits ([`DataLoader`], [`Runner`], [`Evaluator`], [`Proposer`],
//! [`Outputter`]); any error they raise propagates out of
//! [`Optimizer::optimize`] untouched. Nothing is persisted and no process
//! state is mutated; all randomness flows through one PRNG seeded from
//! [`Options::seed`], so a pinned seed with deterministic collaborators
//! reproduces a run exactly.

pub mod assembler;
pub mod collaborators;
pub mod history;
pub mod optimizer;
pub mod progress;
pub mod sampler;
pub mod selector;
pub mod surrogate;
pub mod types;

// Re-export the public surface
pub use collaborators::{
    DataLoader, Evaluator, Outputter, Proposer, ProposerContext, Runner, StageAttempt,
};
pub use history::History;
pub use optimizer::{Optimizer, Options};
pub use progress::{plot_optimization_progress, LiveProgress};
pub use surrogate::StageSurrogate;
pub use types::{Demonstration, Example, Prompt, PromptSet, Trial};
