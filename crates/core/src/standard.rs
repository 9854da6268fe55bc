//! The OpenAI-shaped envelopes the gateway speaks on its public boundary,
//! regardless of which upstream vendor ultimately serves the request.

use serde::{Deserialize, Serialize};

/// A single chat message in the canonical envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// `stop` may arrive as a single string or an array of strings; vendor
/// adapters normalize it to whatever shape their wire format expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Many(Vec<String>),
}

impl StopSequences {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StopSequences::Single(s) => vec![s],
            StopSequences::Many(v) => v,
        }
    }
}

/// The inbound `POST /v1/chat/completions` body, already deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardRequest {
    /// Empty or one of "auto"/"Auto"/"AUTO" selects auto mode.
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub stop: Option<StopSequences>,
    #[serde(default)]
    pub stream: Option<bool>,
}

impl StandardRequest {
    /// True when the caller asked for auto model selection, per §4.2.
    pub fn is_auto(&self) -> bool {
        match self.model.as_deref() {
            None => true,
            Some(m) => m.is_empty() || m.eq_ignore_ascii_case("auto"),
        }
    }

    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    /// The messages with `system`-role entries extracted, used by adapters
    /// (anthropic, gemini, ollama) that fold system prompts elsewhere.
    pub fn split_system(&self) -> (Option<String>, Vec<&Message>) {
        let mut system = String::new();
        let mut rest = Vec::with_capacity(self.messages.len());
        for m in &self.messages {
            match m.role {
                Role::System => {
                    if !system.is_empty() {
                        system.push('\n');
                    }
                    system.push_str(&m.content);
                }
                _ => rest.push(m),
            }
        }
        (if system.is_empty() { None } else { Some(system) }, rest)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    pub finish_reason: FinishReason,
}

/// The outbound unary response, shaped per §4.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl StandardResponse {
    /// Success validation per §4.2: a non-empty choice list whose first
    /// message content is non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        self.choices
            .first()
            .map(|c| !c.message.content.trim().is_empty())
            .unwrap_or(false)
    }
}
