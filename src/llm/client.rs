use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;

/// A text generator addressed by model name
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn generate(&self, model: &str, request: LLMRequest)
        -> Result<LLMResponse, BackendError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

#[async_trait]
impl<T: LLMClient + ?Sized> LLMClient for std::sync::Arc<T> {
    async fn generate(
        &self,
        model: &str,
        request: LLMRequest,
    ) -> Result<LLMResponse, BackendError> {
        (**self).generate(model, request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn model_info(&self) -> Option<String> {
        (**self).model_info()
    }
}
