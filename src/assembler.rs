//! Candidate assembly: the next prompt set from the incumbent best plus one
//! proposer-drafted replacement.
//!
//! The assembler never mutates the incumbent. It hands the proposer a
//! context snapshot (a dataset preview, the program shape, and this stage's
//! attempt history) and splices the returned prompt into a fresh set. When
//! the stage has no attempt history yet, the proposer is contractually
//! expected to return the stage's initial prompt verbatim; the assembler
//! does not special-case that, it just forwards whatever comes back.

use anyhow::Result;

use crate::collaborators::{Proposer, ProposerContext};
use crate::history::History;
use crate::types::{Example, PromptSet};

/// How many examples the dataset preview shows the proposer.
const PREVIEW_EXAMPLES: usize = 3;

/// Textual preview of the dataset: the first three examples, one JSON object
/// per line.
pub fn data_summary(dataset: &[Example]) -> Result<String> {
    let mut lines = Vec::with_capacity(PREVIEW_EXAMPLES);
    for example in dataset.iter().take(PREVIEW_EXAMPLES) {
        lines.push(serde_json::to_string(example)?);
    }
    Ok(lines.join("\n"))
}

/// `"Program stages: "` + comma-joined stage names, declared order.
pub fn program_summary(stages: &[String]) -> String {
    format!("Program stages: {}", stages.join(", "))
}

/// Build the proposer context for `stage` and produce the next candidate:
/// identical to `best` except the entry for `stage`, which is replaced by
/// the proposer's draft.
pub fn assemble_candidate<P: Proposer>(
    proposer: &mut P,
    stage: &str,
    best: &PromptSet,
    initial: &PromptSet,
    stages: &[String],
    dataset: &[Example],
    history: &History,
) -> Result<PromptSet> {
    let ctx = ProposerContext {
        stage_name: stage.to_string(),
        data_summary: data_summary(dataset)?,
        program_summary: program_summary(stages),
        past_attempts: history.attempts_for(stage),
        initial_prompts: initial.clone(),
    };
    let new_prompt = proposer.propose(&ctx)?;
    Ok(best.with_replaced(stage, new_prompt))
}
