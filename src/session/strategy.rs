use crate::gateway::ModelClient;
use crate::session::history::{Message, render_transcript};

/// The four response strategies the auxiliary classification call may
/// pick. Anything else the model returns resolves to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    StepByStep,
    Clarify,
    Creative,
}

pub const DEFAULT_STRATEGY: Strategy = Strategy::Direct;

impl Strategy {
    pub fn all() -> [Strategy; 4] {
        [
            Strategy::Direct,
            Strategy::StepByStep,
            Strategy::Clarify,
            Strategy::Creative,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Direct => "DIRECT",
            Strategy::StepByStep => "STEP_BY_STEP",
            Strategy::Clarify => "CLARIFY",
            Strategy::Creative => "CREATIVE",
        }
    }

    /// Exact-match parse; surrounding whitespace is ignored, anything
    /// else is a mismatch.
    pub fn parse_label(raw: &str) -> Option<Strategy> {
        let trimmed = raw.trim();
        Strategy::all().into_iter().find(|s| s.label() == trimmed)
    }

    /// Template preamble prepended to the user request for this branch.
    pub fn preamble(self) -> &'static str {
        match self {
            Strategy::Direct => "Answer the request directly and concisely.",
            Strategy::StepByStep => {
                "Work through the request step by step, laying out intermediate reasoning in plain language."
            }
            Strategy::Clarify => {
                "Before answering, state the assumptions you are making about anything ambiguous in the request."
            }
            Strategy::Creative => {
                "Take a creative, exploratory angle on the request while staying on topic."
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StrategySelection {
    pub strategy: Strategy,
    pub fell_back: bool,
}

fn classification_prompt(recent: &[Message], notes: &str) -> String {
    let labels = Strategy::all()
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    let mut prompt = format!(
        "Pick the best response strategy for the next reply in this conversation.\nReply with exactly one of these labels and nothing else: {labels}.\n\nRecent conversation:\n{}",
        render_transcript(recent)
    );
    if !notes.trim().is_empty() {
        prompt.push_str("\nSession notes:\n");
        prompt.push_str(notes);
        prompt.push('\n');
    }
    prompt
}

/// One classification call; any failure, empty output, or label mismatch
/// falls back to the default branch.
pub fn select(client: &dyn ModelClient, recent: &[Message], notes: &str) -> StrategySelection {
    let prompt = classification_prompt(recent, notes);
    match client.complete(&prompt) {
        Ok(raw) => match Strategy::parse_label(&raw) {
            Some(strategy) => StrategySelection {
                strategy,
                fell_back: false,
            },
            None => StrategySelection {
                strategy: DEFAULT_STRATEGY,
                fell_back: true,
            },
        },
        Err(_) => StrategySelection {
            strategy: DEFAULT_STRATEGY,
            fell_back: true,
        },
    }
}
