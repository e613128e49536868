use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Queue-driven generator double
///
/// Responses are served in insertion order. Every call is recorded with the
/// model it addressed so tests can assert on retry and fallback behavior.
pub struct MockLLMClient {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub content: String,
    pub error: Option<BackendError>,
}

/// One observed `generate` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: LLMRequest,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
        }
    }

    pub fn error(error: BackendError) -> Self {
        Self {
            content: String::new(),
            error: Some(error),
        }
    }

    pub fn rate_limited() -> Self {
        Self::error(BackendError::ApiError {
            message: "429 Resource has been exhausted (e.g. check quota).".to_string(),
            status_code: None,
        })
    }

    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::error(BackendError::ModelUnavailable {
            model: model.into(),
        })
    }
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::with_name("MockLLM")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Models addressed so far, in call order
    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.model.clone())
            .collect()
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(
        &self,
        model: &str,
        request: LLMRequest,
    ) -> Result<LLMResponse, BackendError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            request,
        });

        let response =
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::Other {
                    message: "MockLLMClient: No more responses in queue".to_string(),
                })?;

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(LLMResponse::text(
            response.content,
            model,
            Duration::from_millis(10),
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ErrorClass;

    #[tokio::test]
    async fn test_mock_client_basic() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("Hello!"));

        let response = client
            .generate("gemini-2.5-flash", LLMRequest::prompt("hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.model, "gemini-2.5-flash");
        assert_eq!(client.models_called(), vec!["gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::rate_limited());

        let err = client
            .generate("m", LLMRequest::prompt("hi"))
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::RateLimit);
    }

    #[tokio::test]
    async fn test_mock_client_no_responses() {
        let client = MockLLMClient::new();
        let result = client.generate("m", LLMRequest::prompt("hi")).await;
        assert!(result.is_err());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_multiple_responses() {
        let client = MockLLMClient::new();
        client.add_responses(vec![
            MockResponse::text("First"),
            MockResponse::text("Second"),
            MockResponse::text("Third"),
        ]);

        assert_eq!(client.remaining_responses(), 3);

        let r1 = client.generate("a", LLMRequest::prompt("1")).await.unwrap();
        assert_eq!(r1.content, "First");

        let r2 = client.generate("b", LLMRequest::prompt("2")).await.unwrap();
        assert_eq!(r2.content, "Second");

        assert_eq!(client.remaining_responses(), 1);
        assert_eq!(client.calls()[1].request.user_text(), "2");
    }

    #[test]
    fn test_custom_name() {
        let client = MockLLMClient::with_name("TestClient");
        assert_eq!(client.name(), "TestClient");
    }
}
