//! Bounded retry loop around the generator
//!
//! The loop is an explicit state machine. Generator failures never escape:
//! every path ends either in parsing a response or in synthesizing the
//! report from repository signals.

use super::context::AnalysisContext;
use super::delay::Delay;
use super::heuristics;
use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::types::AnalysisReport;
use crate::llm::models::next_fallback;
use crate::llm::{ChatMessage, ErrorClass, GenerationConfig, LLMClient, LLMRequest};
use crate::response;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(33);
pub const DEFAULT_MAX_TOTAL_BACKOFF: Duration = Duration::from_secs(300);

/// Attempt and backoff limits for one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound on the sum of all backoff sleeps
    pub max_total_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_total_backoff: DEFAULT_MAX_TOTAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

#[derive(Debug)]
enum State {
    Attempt(u32),
    Parsing(String),
    FallbackSynthesis,
}

/// Drives prompt, generator calls, retries and parsing for one request
pub struct Orchestrator {
    client: Arc<dyn LLMClient>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
    model: String,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        delay: Arc<dyn Delay>,
        policy: RetryPolicy,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            delay,
            policy,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    fn request(&self, model: &str, prompt: &str) -> LLMRequest {
        let request = LLMRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ]);
        GenerationConfig::for_model(model).apply(request)
    }

    fn next_attempt(&self, attempt: u32) -> State {
        if attempt + 1 < self.policy.max_attempts {
            State::Attempt(attempt + 1)
        } else {
            State::FallbackSynthesis
        }
    }

    /// Produces a report for the context; never fails
    pub async fn run(&self, ctx: &AnalysisContext<'_>) -> AnalysisReport {
        let prompt = build_prompt(ctx);
        let mut model = self.model.clone();
        let mut switched_model = false;
        let mut slept = Duration::ZERO;

        let mut state = if self.policy.max_attempts == 0 {
            State::FallbackSynthesis
        } else {
            State::Attempt(0)
        };

        loop {
            state = match state {
                State::Attempt(attempt) => {
                    info!(
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        model = %model,
                        client = self.client.name(),
                        "Requesting analysis"
                    );
                    let request = self.request(&model, &prompt);

                    match self.client.generate(&model, request).await {
                        Ok(response) if !response.is_empty() => {
                            debug!(
                                chars = response.content.len(),
                                elapsed_ms = response.response_time.as_millis() as u64,
                                "Generator responded"
                            );
                            State::Parsing(response.content)
                        }
                        Ok(_) => {
                            warn!(attempt = attempt + 1, "Generator returned an empty response");
                            self.next_attempt(attempt)
                        }
                        Err(err) => match err.class() {
                            ErrorClass::RateLimit if attempt + 1 < self.policy.max_attempts => {
                                let wait = self.policy.backoff(attempt);
                                if slept.saturating_add(wait) > self.policy.max_total_backoff {
                                    warn!(
                                        waited_secs = slept.as_secs(),
                                        "Backoff budget exhausted, using signal defaults"
                                    );
                                    State::FallbackSynthesis
                                } else {
                                    warn!(
                                        error = %err,
                                        wait_secs = wait.as_secs(),
                                        "Generator rate limited, backing off"
                                    );
                                    self.delay.sleep(wait).await;
                                    slept += wait;
                                    State::Attempt(attempt + 1)
                                }
                            }
                            ErrorClass::RateLimit => {
                                warn!(error = %err, "Generator rate limited on final attempt");
                                State::FallbackSynthesis
                            }
                            ErrorClass::InvalidModel if attempt == 0 && !switched_model => {
                                switched_model = true;
                                match next_fallback(&model) {
                                    Some(next) => {
                                        warn!(from = %model, to = next, "Model unavailable, switching");
                                        model = next.to_string();
                                        State::Attempt(0)
                                    }
                                    None => self.next_attempt(attempt),
                                }
                            }
                            class => {
                                warn!(error = %err, ?class, attempt = attempt + 1, "Generator call failed");
                                self.next_attempt(attempt)
                            }
                        },
                    }
                }
                State::Parsing(text) => return response::process(&text, ctx),
                State::FallbackSynthesis => {
                    info!("Synthesizing analysis from repository signals");
                    return heuristics::fallback_report(ctx);
                }
            };
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("client", &self.client.name())
            .field("policy", &self.policy)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::delay::RecordingDelay;
    use crate::analysis::Provenance;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};
    use crate::pipeline::ShellDialect;
    use crate::repository::RepositoryStructure;

    const VALID: &str = r#"{"analysis": {"project_type": "Flask API", "install_commands": ["pip install flask"], "run_commands": ["flask run"]}, "explanation": "ok"}"#;

    fn setup(responses: Vec<MockResponse>) -> (Arc<MockLLMClient>, Arc<RecordingDelay>, Orchestrator) {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(responses);
        let delay = Arc::new(RecordingDelay::new());
        let orchestrator = Orchestrator::new(
            client.clone(),
            delay.clone(),
            RetryPolicy::default(),
            "gemini-2.5-pro",
        );
        (client, delay, orchestrator)
    }

    fn repo() -> RepositoryStructure {
        let mut structure = RepositoryStructure::default();
        structure
            .key_files
            .insert("requirements.txt".into(), "flask\n".into());
        structure
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(33));
        assert_eq!(policy.backoff(1), Duration::from_secs(66));
        assert_eq!(policy.backoff(2), Duration::from_secs(132));
    }

    #[tokio::test]
    async fn test_first_response_parsed() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, delay, orchestrator) = setup(vec![MockResponse::text(VALID)]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(report.provenance, Provenance::Generator);
        assert_eq!(report.analysis.project_type.as_str(), "Flask API");
        assert_eq!(client.call_count(), 1);
        assert!(delay.recorded().is_empty());

        let call = &client.calls()[0];
        assert_eq!(call.request.temperature, Some(0.1));
        assert_eq!(call.request.max_tokens, Some(4096));
        assert!(call.request.user_text().contains("REPOSITORY INFORMATION"));
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, delay, orchestrator) = setup(vec![
            MockResponse::rate_limited(),
            MockResponse::rate_limited(),
            MockResponse::rate_limited(),
        ]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(client.call_count(), 3);
        assert_eq!(
            delay.recorded(),
            vec![Duration::from_secs(33), Duration::from_secs(66)]
        );
        assert_eq!(report.provenance, Provenance::Heuristic);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, delay, orchestrator) =
            setup(vec![MockResponse::rate_limited(), MockResponse::text(VALID)]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(client.call_count(), 2);
        assert_eq!(delay.total(), Duration::from_secs(33));
        assert_eq!(report.provenance, Provenance::Generator);
    }

    #[tokio::test]
    async fn test_backoff_budget() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![MockResponse::rate_limited(), MockResponse::rate_limited()]);
        let delay = Arc::new(RecordingDelay::new());
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
            max_total_backoff: Duration::from_secs(15),
        };
        let orchestrator = Orchestrator::new(client.clone(), delay.clone(), policy, "gemini-2.5-flash");

        let report = orchestrator.run(&ctx).await;
        assert_eq!(client.call_count(), 2);
        assert_eq!(delay.recorded(), vec![Duration::from_secs(10)]);
        assert_eq!(report.provenance, Provenance::Heuristic);
    }

    #[tokio::test]
    async fn test_model_switch_does_not_consume_attempt() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, _delay, orchestrator) = setup(vec![
            MockResponse::model_not_found("gemini-2.5-pro"),
            MockResponse::text(""),
            MockResponse::text(""),
            MockResponse::text(VALID),
        ]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(
            client.models_called(),
            vec![
                "gemini-2.5-pro",
                "gemini-2.5-flash",
                "gemini-2.5-flash",
                "gemini-2.5-flash"
            ]
        );
        assert_eq!(report.provenance, Provenance::Generator);
    }

    #[tokio::test]
    async fn test_model_switch_only_once() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, _delay, orchestrator) = setup(vec![
            MockResponse::model_not_found("gemini-2.5-pro"),
            MockResponse::model_not_found("gemini-2.5-flash"),
            MockResponse::model_not_found("gemini-2.5-flash"),
            MockResponse::model_not_found("gemini-2.5-flash"),
        ]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(client.call_count(), 4);
        assert_eq!(report.provenance, Provenance::Heuristic);
    }

    #[tokio::test]
    async fn test_other_errors_do_not_sleep() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let (client, delay, orchestrator) = setup(vec![
            MockResponse::error(BackendError::TimeoutError { seconds: 30 }),
            MockResponse::error(BackendError::NetworkError {
                message: "connection reset".into(),
            }),
            MockResponse::error(BackendError::AuthenticationError {
                message: "bad key".into(),
            }),
        ]);

        let report = orchestrator.run(&ctx).await;
        assert_eq!(client.call_count(), 3);
        assert!(delay.recorded().is_empty());
        assert_eq!(report.provenance, Provenance::Heuristic);
        assert!(!report.jenkinsfile.is_empty());
    }
}
