//! Generator request/response types
//!
//! Provider-independent; the genai adapter and the mock both speak these.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to send to the generator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMRequest {
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0 - 1.0)
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    /// Maximum output tokens
    pub max_tokens: Option<u32>,
}

impl LLMRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Single user-message request
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::user(prompt)])
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Concatenated text of every user message
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Response from the generator
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    /// Model that produced the response
    pub model: String,
    pub response_time: Duration,
}

impl LLMResponse {
    pub fn text(
        content: impl Into<String>,
        model: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            response_time,
        }
    }

    /// True when the generator returned nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LLMRequest::prompt("Hello")
            .with_temperature(0.1)
            .with_top_p(0.95)
            .with_top_k(40)
            .with_max_tokens(4096);

        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.top_p, Some(0.95));
        assert_eq!(request.top_k, Some(40));
        assert_eq!(request.max_tokens, Some(4096));
        assert_eq!(request.user_text(), "Hello");
    }

    #[test]
    fn test_user_text_skips_system() {
        let request = LLMRequest::new(vec![
            ChatMessage::system("rules"),
            ChatMessage::user("a"),
            ChatMessage::user("b"),
        ]);
        assert_eq!(request.user_text(), "a\nb");
    }

    #[test]
    fn test_empty_response() {
        let response = LLMResponse::text("  \n", "m", Duration::from_millis(1));
        assert!(response.is_empty());
    }
}
