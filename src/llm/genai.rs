//! GenAI-based generator client
//!
//! Wraps the `genai` crate so any provider it supports (Gemini by default)
//! can serve as the text generator. The model is chosen per call, which lets
//! the orchestrator switch models between attempts on one client.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::Duration;
use tracing::{debug, error};

/// Environment variable overriding the provider endpoint
pub const API_BASE_URL_ENV: &str = "PIPEFORGE_API_BASE_URL";

pub struct GenAIClient {
    client: Client,
    provider: AdapterKind,
    timeout: Duration,
}

/// True when the provider needs no key or its key variable is set
pub fn provider_has_credentials(provider: AdapterKind) -> bool {
    match provider.default_key_env_name() {
        None => true,
        Some(env_var) => std::env::var(env_var).is_ok(),
    }
}

/// Parses a provider name as accepted on the command line and in config
pub fn parse_provider(name: &str) -> Option<AdapterKind> {
    AdapterKind::from_lower_str(&name.trim().to_lowercase())
}

impl GenAIClient {
    pub fn new(provider: AdapterKind, timeout: Duration) -> Self {
        let client = match std::env::var(API_BASE_URL_ENV) {
            Ok(endpoint_url) => {
                debug!(
                    "Using custom endpoint for {}: {}",
                    provider.as_str(),
                    endpoint_url
                );

                let resolver = ServiceTargetResolver::from_resolver_fn(
                    move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                        let endpoint = Endpoint::from_owned(endpoint_url.clone());
                        let auth = match provider.default_key_env_name() {
                            Some(api_key_var) => AuthData::from_env(api_key_var),
                            None => AuthData::from_single(""),
                        };
                        let model = ModelIden::new(provider, service_target.model.model_name);

                        Ok(ServiceTarget {
                            endpoint,
                            auth,
                            model,
                        })
                    },
                );

                Client::builder()
                    .with_service_target_resolver(resolver)
                    .build()
            }
            Err(_) => Client::default(),
        };

        debug!("Creating GenAI client: provider={}", provider.as_str());

        Self {
            client,
            provider,
            timeout,
        }
    }

    pub fn provider(&self) -> AdapterKind {
        self.provider
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }

    /// genai has no top-k option; it stays on the request for other clients
    fn chat_options(request: &LLMRequest) -> ChatOptions {
        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(top_p) = request.top_p {
            options = options.with_top_p(top_p as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }
        options
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn generate(
        &self,
        model: &str,
        request: LLMRequest,
    ) -> Result<LLMResponse, BackendError> {
        let start = std::time::Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let options = Self::chat_options(&request);
        let genai_request = GenAIChatRequest::new(messages);

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.as_str(), e);
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.as_str(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();
        debug!(
            model,
            chars = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generator responded"
        );

        Ok(LLMResponse::text(content, model, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.provider.as_str().to_string())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("timeout", &self.timeout)
            .finish()
    }
}
