//! In-memory doubles for the reasoning service, the operator and actions.
//!
//! Enabled for this crate's tests and, through the `test-support` feature,
//! for downstream crates' tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::action::{Action, ActionContext, ActionError};
use crate::llm::{ChatMessage, ChatReply, ReasoningError, ReasoningService, ToolSpec};
use crate::operator::Operator;

/// A request as seen by `ScriptedReasoner`
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
}

/// Replies with a fixed queue of answers and records every request.
/// An exhausted queue fails with `ReasoningError::Api`.
#[derive(Default)]
pub struct ScriptedReasoner {
    replies: Mutex<VecDeque<ChatReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedReasoner {
    pub fn new(replies: impl IntoIterator<Item = ChatReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Shortcut for a queue of plain-text replies
    pub fn texts<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::new(replies.into_iter().map(|s| ChatReply::Text(s.into())))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoner {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, ReasoningError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                messages: messages.to_vec(),
                tools: tools.to_vec(),
            });
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .ok_or_else(|| ReasoningError::Api("script exhausted".to_string()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Answers prompts from a fixed queue and keeps a transcript
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Every prompt passed to `ask`, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Every line passed to `say`, in order
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))
    }
}

/// Returns the same text every time and counts its invocations
#[derive(Debug, Clone)]
pub struct FixedAction {
    description: String,
    output: String,
    calls: Arc<AtomicUsize>,
}

impl FixedAction {
    pub fn new(description: &str, output: &str) -> Self {
        Self {
            description: description.to_string(),
            output: output.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter; clone it before handing the action to a registry
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Action for FixedAction {
    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, _ctx: &mut ActionContext<'_>) -> Result<String, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}
