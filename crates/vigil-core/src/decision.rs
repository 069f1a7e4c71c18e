//! Decision step: ask the reasoning service what to do next

use crate::action::{ActionKind, ActionRegistry};
use crate::error::AgentError;
use crate::llm::{ChatReply, ReasoningService};
use crate::state::{ActionCall, ConversationState, Decision};

/// System prompt for the decision step
const SYSTEM_PROMPT: &str = "You are a security assistant running inside VIGIL. You help an analyst by choosing one of the tools below, one at a time. Every tool call is shown to the analyst for approval before it runs.

TOOLS YOU HAVE:
{tools}

GUIDELINES:
• Call a tool only when it moves the analyst's request forward
• Tools take no arguments
• When the request is satisfied, answer in plain text without calling a tool
• {instructions}";

pub fn system_prompt(registry: &ActionRegistry, instructions: &str) -> String {
    let tools = registry
        .tool_specs()
        .iter()
        .map(|t| format!("• {} - {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    SYSTEM_PROMPT
        .replace("{tools}", &tools)
        .replace("{instructions}", instructions)
}

/// Ask for the next decision given everything that has happened so far.
///
/// A tool name outside the registry fails with `AgentError::UnknownAction`.
pub async fn decide(
    reasoner: &dyn ReasoningService,
    registry: &ActionRegistry,
    state: &ConversationState,
    instructions: &str,
) -> Result<Decision, AgentError> {
    let messages = state.to_messages(&system_prompt(registry, instructions));
    let tools = registry.tool_specs();

    match reasoner.chat(&messages, &tools).await? {
        ChatReply::ToolCall { call_id, name } => {
            let kind: ActionKind = name.parse()?;
            Ok(Decision::Invoke(ActionCall { kind, call_id }))
        }
        ChatReply::Text(answer) => Ok(Decision::Finish(answer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedAction, ScriptedReasoner};

    fn registry() -> ActionRegistry {
        ActionRegistry::new(
            FixedAction::new("use to create threat models", "m"),
            FixedAction::new("Use to create threat scenarios", "i"),
        )
    }

    #[test]
    fn test_system_prompt_lists_tools() {
        let prompt = system_prompt(&registry(), "Use at most 4 tool calls");
        assert!(prompt.contains("• Model - use to create threat models"));
        assert!(prompt.contains("• Intelligence - Use to create threat scenarios"));
        assert!(prompt.contains("Use at most 4 tool calls"));
        assert!(!prompt.contains("{tools}"));
    }

    #[tokio::test]
    async fn test_tool_call_becomes_invoke() {
        let reasoner = ScriptedReasoner::new([ChatReply::ToolCall {
            call_id: "call_9".to_string(),
            name: "Intelligence".to_string(),
        }]);
        let state = ConversationState::new("build me a scenario");

        let decision = decide(&reasoner, &registry(), &state, "").await.unwrap();
        assert_eq!(
            decision,
            Decision::Invoke(ActionCall {
                kind: ActionKind::Intelligence,
                call_id: "call_9".to_string()
            })
        );

        let requests = reasoner.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 2);
    }

    #[tokio::test]
    async fn test_text_becomes_finish() {
        let reasoner = ScriptedReasoner::new([ChatReply::Text("Nothing to do.".to_string())]);
        let state = ConversationState::new("hello");
        let decision = decide(&reasoner, &registry(), &state, "").await.unwrap();
        assert_eq!(decision, Decision::Finish("Nothing to do.".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected() {
        let reasoner = ScriptedReasoner::new([ChatReply::ToolCall {
            call_id: "call_1".to_string(),
            name: "Search".to_string(),
        }]);
        let state = ConversationState::new("look something up");
        let err = decide(&reasoner, &registry(), &state, "").await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownAction(name) if name == "Search"));
    }
}
