//! Reasoning service abstraction
//!
//! The loop and the actions only see `ReasoningService`. The one real
//! implementation talks to any OpenAI-compatible chat-completions endpoint
//! (OpenRouter by default).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;

use crate::config::AgentConfig;

/// A tool the reasoning service may choose. Vigil's tools take no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// A message in the conversation sent to the reasoning service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    System(String),
    User(String),
    /// The assistant asked for a tool on an earlier turn
    AssistantToolCall { call_id: String, name: String },
    /// Output of that tool
    ToolResult { call_id: String, content: String },
}

/// What the reasoning service answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    ToolCall { call_id: String, name: String },
    Text(String),
}

#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Expected text but the model asked for tool '{0}'")]
    UnexpectedToolCall(String),
}

/// Trait for reasoning providers
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Send the conversation and the available tools, get one reply back.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, ReasoningError>;

    /// Model identifier for display
    fn model(&self) -> &str;
}

/// Single-shot completion with no tools offered.
pub async fn complete(
    service: &dyn ReasoningService,
    system: &str,
    user: &str,
) -> Result<String, ReasoningError> {
    let messages = [
        ChatMessage::System(system.to_string()),
        ChatMessage::User(user.to_string()),
    ];
    match service.chat(&messages, &[]).await? {
        ChatReply::Text(text) => Ok(text),
        ChatReply::ToolCall { name, .. } => Err(ReasoningError::UnexpectedToolCall(name)),
    }
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: AgentConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: AgentConfig) -> Result<Self, ReasoningError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ReasoningService for OpenAiCompatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, ReasoningError> {
        let body = request_body(&self.config, messages, tools);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat request"
        );

        let resp = self
            .http
            .post(&self.config.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat request rejected");
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await?;
        parse_reply(&json)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Build the JSON request body
pub fn request_body(config: &AgentConfig, messages: &[ChatMessage], tools: &[ToolSpec]) -> Value {
    let wire_messages: Vec<Value> = messages.iter().map(message_to_wire).collect();

    let mut body = serde_json::json!({
        "model": config.model,
        "messages": wire_messages,
        "temperature": config.temperature,
    });

    // Only include tools if we have them
    if !tools.is_empty() {
        let wire_tools: Vec<Value> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": { "type": "object", "properties": {} }
                    }
                })
            })
            .collect();
        body["tools"] = Value::Array(wire_tools);
        body["tool_choice"] = Value::String("auto".to_string());
    }

    body
}

fn message_to_wire(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System(content) => serde_json::json!({"role": "system", "content": content}),
        ChatMessage::User(content) => serde_json::json!({"role": "user", "content": content}),
        ChatMessage::AssistantToolCall { call_id, name } => serde_json::json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": [{
                "id": call_id,
                "type": "function",
                "function": { "name": name, "arguments": "{}" }
            }]
        }),
        ChatMessage::ToolResult { call_id, content } => serde_json::json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
    }
}

/// Turn a chat-completions response into a `ChatReply`.
///
/// Only the first tool call is honoured; one action runs per iteration.
pub fn parse_reply(json: &Value) -> Result<ChatReply, ReasoningError> {
    if let Some(err) = json.get("error") {
        let msg = err["message"].as_str().unwrap_or("Unknown API error");
        tracing::warn!(error = msg, "reasoning service returned an error");
        return Err(ReasoningError::Api(msg.to_string()));
    }

    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ReasoningError::MalformedResponse("missing choices[0].message".to_string()))?;

    if let Some(calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        if let Some(first) = calls.first() {
            if calls.len() > 1 {
                tracing::warn!(count = calls.len(), "model requested several tools, using the first");
            }
            let name = first["function"]["name"]
                .as_str()
                .ok_or_else(|| ReasoningError::MalformedResponse("tool call without a name".to_string()))?;
            // Replayed history needs a distinct id per call
            let call_id = match first["id"].as_str() {
                Some(id) => id.to_string(),
                None => format!("call_{}", uuid::Uuid::new_v4().simple()),
            };
            return Ok(ChatReply::ToolCall {
                call_id,
                name: name.to_string(),
            });
        }
    }

    match message.get("content").and_then(|c| c.as_str()) {
        Some(text) => Ok(ChatReply::Text(text.to_string())),
        None => Err(ReasoningError::MalformedResponse("message has neither content nor tool calls".to_string())),
    }
}
