//! Request-level entry point: fetch, analyze, report

use super::context::AnalysisContext;
use super::delay::{Delay, TokioDelay};
use super::heuristics;
use super::orchestrator::{Orchestrator, RetryPolicy};
use super::types::AnalysisReport;
use super::AnalysisError;
use crate::llm::models::select_model;
use crate::llm::LLMClient;
use crate::pipeline::ShellDialect;
use crate::repository::{FetchError, RepositorySource};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// One analysis request as received from a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub owner: String,
    pub repo: String,
    /// Branch to fetch; empty uses the repository default
    pub branch: String,
    /// Dialect tag, parsed when the request runs
    pub shell_environment: String,
    pub model: Option<String>,
}

impl AnalysisRequest {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: String::new(),
            shell_environment: ShellDialect::default().as_str().to_string(),
            model: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell_environment = shell.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Errors surfaced to callers of [`AnalysisService`]
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to fetch repository: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            ServiceError::Fetch(FetchError::NotFound { owner, repo }) => format!(
                "Error: Repository {owner}/{repo} not found\n\n\
                Help: Check that:\n\
                - The owner and repository names are spelled correctly\n\
                - The repository is public, or GITHUB_TOKEN grants access to it"
            ),
            ServiceError::Fetch(FetchError::RateLimited { .. }) => format!(
                "Error: {self}\n\n\
                Help: Unauthenticated GitHub requests are heavily rate limited.\n\
                Set GITHUB_TOKEN to a personal access token and retry."
            ),
            ServiceError::Fetch(err) => format!(
                "Error: Failed to fetch repository\n\n\
                Help: Check network connectivity and the repository location.\n\n\
                Details: {err}"
            ),
            ServiceError::Analysis(AnalysisError::UnsupportedDialect(tag)) => format!(
                "Error: Unsupported shell environment '{tag}'\n\n\
                Help: Use one of: posix, windows, apple-script"
            ),
            ServiceError::Config(msg) => format!(
                "Error: Invalid configuration\n\n\
                Help: Check the PIPEFORGE_* environment variables.\n\n\
                Details: {msg}"
            ),
        }
    }
}

/// Fetches a repository and produces its [`AnalysisReport`]
///
/// Without a generator the service runs offline and every report comes from
/// repository signals alone.
pub struct AnalysisService {
    source: Arc<dyn RepositorySource>,
    client: Option<Arc<dyn LLMClient>>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
    default_model: Option<String>,
}

impl AnalysisService {
    pub fn new(source: Arc<dyn RepositorySource>) -> Self {
        Self {
            source,
            client: None,
            delay: Arc::new(TokioDelay),
            policy: RetryPolicy::default(),
            default_model: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_model(mut self, model: Option<String>) -> Self {
        self.default_model = model;
        self
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, ServiceError> {
        let dialect = request
            .shell_environment
            .parse::<ShellDialect>()
            .map_err(AnalysisError::from)?;
        let start = Instant::now();
        info!(
            owner = %request.owner,
            repo = %request.repo,
            source = self.source.name(),
            shell = %dialect,
            "Analyzing repository"
        );

        let structure = self
            .source
            .fetch(&request.owner, &request.repo, &request.branch)
            .await?;

        let mut ctx = AnalysisContext::new(&structure, dialect).with_branch(request.branch.clone());
        if ctx.repository_url.is_none() && !request.owner.is_empty() {
            ctx = ctx.with_repository_url(format!(
                "https://github.com/{}/{}.git",
                request.owner, request.repo
            ));
        }

        let report = match &self.client {
            Some(client) => {
                let requested = request.model.as_deref().or(self.default_model.as_deref());
                let orchestrator = Orchestrator::new(
                    client.clone(),
                    self.delay.clone(),
                    self.policy,
                    select_model(requested),
                );
                orchestrator.run(&ctx).await
            }
            None => {
                info!("No generator configured, using repository signals");
                heuristics::fallback_report(&ctx)
            }
        };

        info!(
            provenance = %report.provenance,
            project_type = %report.analysis.project_type,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("source", &self.source.name())
            .field("client", &self.client.as_ref().map(|c| c.name().to_string()))
            .field("policy", &self.policy)
            .finish()
    }
}
