//! Vigil Core - Decision loop, action registry, and reasoning client
//!
//! This crate contains the shared logic behind every Vigil frontend. The CLI
//! supplies an operator (console I/O) and the concrete actions; the loop
//! handles deciding, confirming, and executing.

pub mod action;
pub mod agent;
pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod llm;
pub mod operator;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{Action, ActionContext, ActionError, ActionKind, ActionRegistry};
pub use agent::{run_agent, AgentEvent, RunOutcome};
pub use config::{AgentConfig, ConfigError};
pub use error::AgentError;
pub use gate::{ConfirmationGate, PromptGate};
pub use llm::{ChatMessage, ChatReply, OpenAiCompatClient, ReasoningError, ReasoningService, ToolSpec};
pub use operator::Operator;
pub use state::{ActionCall, ConversationState, Decision, Step};
