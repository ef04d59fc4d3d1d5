//! Core data model: training examples, prompts, and trial records.
//!
//! Design decisions:
//! - Records are plain owned data, cloned freely between trials. A prompt set
//!   holds one entry per pipeline stage, so copies are cheap next to the LLM
//!   calls that dominate a trial.
//! - Everything derives serde so an embedding application can checkpoint a
//!   ledger or ship it over a wire; the optimizer itself never touches disk.
//! - [`PromptSet`] keeps its mapping in a `BTreeMap` so iteration and
//!   serialization order are deterministic across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A labeled training example: input text plus the expected target.
///
/// Loaded once before optimization and immutable thereafter. Both sides are
/// expected to be non-empty; that is the data loader's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input_text: String,
    pub target: String,
}

impl Example {
    pub fn new(input_text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            target: target.into(),
        }
    }
}

/// An input/output pair bundled with an instruction as a few-shot demo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demonstration {
    pub input: String,
    pub output: String,
}

impl Demonstration {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// An instruction plus zero or more demonstrations, used verbatim as LLM
/// input. Immutable once proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// The instruction text. Non-empty for any prompt a proposer returns.
    pub instruction: String,
    /// Demonstrations in presentation order.
    #[serde(default)]
    pub demos: Vec<Demonstration>,
}

impl Prompt {
    /// A prompt carrying only an instruction, no demonstrations.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            demos: Vec::new(),
        }
    }

    /// Attach demonstrations.
    pub fn with_demos(mut self, demos: Vec<Demonstration>) -> Self {
        self.demos = demos;
        self
    }
}

// Bare instruction strings normalize to a prompt with no demos.
impl From<&str> for Prompt {
    fn from(instruction: &str) -> Self {
        Prompt::new(instruction)
    }
}

impl From<String> for Prompt {
    fn from(instruction: String) -> Self {
        Prompt::new(instruction)
    }
}

/// The complete mapping from stage name to prompt needed for one pipeline
/// execution.
///
/// Keys must exactly equal the declared stage set; the optimizer validates
/// coverage before the first trial and [`PromptSet::with_replaced`] preserves
/// it afterwards. A new value is produced per trial; old values live on in
/// the history ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptSet {
    prompts: BTreeMap<String, Prompt>,
}

impl PromptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a stage's prompt. Accepts anything that converts to
    /// a [`Prompt`], so a bare instruction string works.
    pub fn insert(&mut self, stage: impl Into<String>, prompt: impl Into<Prompt>) {
        self.prompts.insert(stage.into(), prompt.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_prompt(mut self, stage: impl Into<String>, prompt: impl Into<Prompt>) -> Self {
        self.insert(stage, prompt);
        self
    }

    pub fn get(&self, stage: &str) -> Option<&Prompt> {
        self.prompts.get(stage)
    }

    /// A fresh set identical to this one except for `stage`, which maps to
    /// `prompt`. Inserts when the stage had no entry yet.
    pub fn with_replaced(&self, stage: &str, prompt: Prompt) -> Self {
        let mut next = self.clone();
        next.prompts.insert(stage.to_string(), prompt);
        next
    }

    /// Stage names in sorted order.
    pub fn stages(&self) -> impl Iterator<Item = &String> {
        self.prompts.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Prompt)> {
        self.prompts.iter()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Does every declared stage have an entry?
    pub fn covers(&self, stages: &[String]) -> bool {
        stages.iter().all(|s| self.prompts.contains_key(s))
    }
}

/// One recorded trial: the candidate prompt set and the batch score it got.
///
/// Appended to the history ledger and never mutated. `iteration` equals the
/// trial's position in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub iteration: usize,
    pub prompts: PromptSet,
    /// May be non-finite when the evaluator misbehaves; such trials are
    /// recorded but never become the incumbent best.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_normalizes_to_demo_free_prompt() {
        let prompt: Prompt = "Answer concisely.".into();
        assert_eq!(prompt.instruction, "Answer concisely.");
        assert!(prompt.demos.is_empty());
    }

    #[test]
    fn with_replaced_leaves_original_untouched() {
        let original = PromptSet::new()
            .with_prompt("draft", "Draft an answer.")
            .with_prompt("refine", "Refine the draft.");
        let snapshot = original.clone();

        let next = original.with_replaced("draft", Prompt::new("Draft v2."));

        assert_eq!(original, snapshot);
        assert_eq!(next.get("draft").unwrap().instruction, "Draft v2.");
        assert_eq!(next.get("refine"), original.get("refine"));
    }

    #[test]
    fn with_replaced_inserts_missing_stage() {
        let sparse = PromptSet::new().with_prompt("draft", "Draft.");
        let next = sparse.with_replaced("refine", Prompt::new("Refine."));
        assert_eq!(next.len(), 2);
        assert!(next.get("refine").is_some());
    }

    #[test]
    fn covers_checks_every_declared_stage() {
        let set = PromptSet::new().with_prompt("draft", "Draft.");
        assert!(set.covers(&["draft".to_string()]));
        assert!(!set.covers(&["draft".to_string(), "refine".to_string()]));
    }

    #[test]
    fn prompt_set_serializes_deterministically() {
        let set = PromptSet::new()
            .with_prompt("zeta", "Z.")
            .with_prompt("alpha", "A.");
        let a = serde_json::to_string(&set).unwrap();
        let b = serde_json::to_string(&set.clone()).unwrap();
        assert_eq!(a, b);
        // BTreeMap keys come out sorted
        assert!(a.find("alpha").unwrap() < a.find("zeta").unwrap());
    }
}
