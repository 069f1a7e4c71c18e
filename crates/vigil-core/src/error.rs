//! Errors that end a run

use crate::action::{ActionError, ActionKind};
use crate::llm::ReasoningError;
use thiserror::Error;

/// Anything that stops the loop without an outcome.
///
/// Operator rejection is not listed here: it is a normal outcome
/// (`RunOutcome::Aborted`), not a failure.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Reasoning service failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Unknown action requested: {0}")]
    UnknownAction(String),

    #[error("Action {kind} failed: {source}")]
    Action {
        kind: ActionKind,
        #[source]
        source: ActionError,
    },

    #[error("Operator input failed: {0}")]
    Operator(#[from] std::io::Error),

    #[error("Step limit reached after {0} actions")]
    StepLimit(usize),
}
