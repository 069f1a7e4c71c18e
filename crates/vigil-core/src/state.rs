//! Conversation state for a single run

use std::fmt;

use chrono::{DateTime, Utc};

use crate::action::ActionKind;
use crate::llm::ChatMessage;

/// An accepted request to run one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub kind: ActionKind,
    /// Id the reasoning service attached to the tool call, echoed back with
    /// the result
    pub call_id: String,
}

impl fmt::Display for ActionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.call_id)
    }
}

/// What the reasoning service wants next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Invoke(ActionCall),
    Finish(String),
}

/// One executed action and its output
#[derive(Debug, Clone)]
pub struct Step {
    pub call: ActionCall,
    pub result: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConversationState {
    pub input: String,
    steps: Vec<Step>,
    /// Stop right after the first action and hand its output back
    pub return_direct: bool,
}

impl ConversationState {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            steps: Vec::new(),
            return_direct: false,
        }
    }

    pub fn with_return_direct(mut self, return_direct: bool) -> Self {
        self.return_direct = return_direct;
        self
    }

    /// Steps in the order they were accepted
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn record(&mut self, call: ActionCall, result: String) {
        self.steps.push(Step {
            call,
            result,
            completed_at: Utc::now(),
        });
    }

    /// Replay the run so far as chat messages
    pub fn to_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2 + self.steps.len() * 2);
        messages.push(ChatMessage::System(system_prompt.to_string()));
        messages.push(ChatMessage::User(self.input.clone()));
        for step in &self.steps {
            messages.push(ChatMessage::AssistantToolCall {
                call_id: step.call.call_id.clone(),
                name: step.call.kind.name().to_string(),
            });
            messages.push(ChatMessage::ToolResult {
                call_id: step.call.call_id.clone(),
                content: step.result.clone(),
            });
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_replay_steps_in_order() {
        let mut state = ConversationState::new("run a threat model");
        state.record(
            ActionCall {
                kind: ActionKind::Model,
                call_id: "c1".to_string(),
            },
            "model report".to_string(),
        );
        state.record(
            ActionCall {
                kind: ActionKind::Intelligence,
                call_id: "c2".to_string(),
            },
            "scenario".to_string(),
        );

        let messages = state.to_messages("sys");
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[1], ChatMessage::User("run a threat model".to_string()));
        assert_eq!(
            messages[4],
            ChatMessage::AssistantToolCall {
                call_id: "c2".to_string(),
                name: "Intelligence".to_string()
            }
        );
        assert_eq!(
            messages[5],
            ChatMessage::ToolResult {
                call_id: "c2".to_string(),
                content: "scenario".to_string()
            }
        );
    }
}
