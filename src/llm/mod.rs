//! Text generator abstraction layer
//!
//! The orchestrator talks to an [`LLMClient`]; `GenAIClient` reaches real
//! providers and `MockLLMClient` serves queued responses in tests.

mod client;
mod error;
mod genai;
mod mock;
pub mod models;
mod types;

pub use client::LLMClient;
pub use error::{BackendError, ErrorClass};
pub use genai::{parse_provider, provider_has_credentials, GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse, RecordedCall};
pub use models::{GenerationConfig, ModelInfo, ModelTier};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
