//! Action registry
//!
//! Exactly two actions exist. The registry holds one implementation for each
//! `ActionKind`, so a lookup can never miss; a name coming back from the
//! reasoning service is checked when it is parsed into an `ActionKind`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{ReasoningService, ToolSpec};
use crate::operator::Operator;

/// Error type returned by action implementations
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of actions the loop may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Generate a STRIDE threat model
    Model,
    /// Generate an incident response scenario
    Intelligence,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Model, ActionKind::Intelligence];

    /// Tool name as presented to the reasoning service
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Model => "Model",
            ActionKind::Intelligence => "Intelligence",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| AgentError::UnknownAction(s.to_string()))
    }
}

/// Everything an action may touch while it runs
pub struct ActionContext<'a> {
    pub reasoner: &'a dyn ReasoningService,
    pub operator: &'a mut dyn Operator,
}

/// An argument-less action. The decision only picks which one runs.
#[async_trait]
pub trait Action: Send + Sync {
    /// One-line description offered to the reasoning service
    fn description(&self) -> &str;

    async fn run(&self, ctx: &mut ActionContext<'_>) -> Result<String, ActionError>;
}

/// Total mapping from `ActionKind` to its implementation
pub struct ActionRegistry {
    model: Box<dyn Action>,
    intelligence: Box<dyn Action>,
}

impl ActionRegistry {
    pub fn new(model: impl Action + 'static, intelligence: impl Action + 'static) -> Self {
        Self {
            model: Box::new(model),
            intelligence: Box::new(intelligence),
        }
    }

    pub fn get(&self, kind: ActionKind) -> &dyn Action {
        match kind {
            ActionKind::Model => self.model.as_ref(),
            ActionKind::Intelligence => self.intelligence.as_ref(),
        }
    }

    /// Tool descriptions for the decision prompt, in `ActionKind::ALL` order
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        ActionKind::ALL
            .into_iter()
            .map(|kind| ToolSpec {
                name: kind.name().to_string(),
                description: self.get(kind).description().to_string(),
            })
            .collect()
    }
}
