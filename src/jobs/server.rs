//! Publishing compiled jobs through a build-server collaborator

use super::compiler::{compile, CompileError};
use super::plugins::{InstalledPlugin, PluginCheck, PluginRequirements};
use super::types::{fields, JobSpec, JobType};
use crate::analysis::AnalysisReport;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure reported by the build server itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("build server error{}: {message}", status.map(|s| format!(" {s}")).unwrap_or_default())]
pub struct ServerError {
    pub status: Option<u16>,
    pub message: String,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// The external build server, seen only through its job operations
#[async_trait]
pub trait BuildServer: Send + Sync {
    async fn installed_plugins(&self) -> Result<Vec<InstalledPlugin>, ServerError>;

    async fn job_exists(&self, name: &str) -> Result<bool, ServerError>;

    async fn create_job(&self, name: &str, descriptor: &str) -> Result<(), ServerError>;

    async fn update_job(&self, name: &str, descriptor: &str) -> Result<(), ServerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Refuse to touch an existing job
    #[default]
    Create,
    /// Update an existing job, creating it when absent
    Upsert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Created,
    Updated,
    Duplicate,
    PluginsMissing(PluginCheck),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid job name '{0}': use letters, numbers, underscores, dots and hyphens")]
    InvalidName(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

fn job_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid job name regex"))
}

pub fn is_valid_job_name(name: &str) -> bool {
    job_name_pattern().is_match(name)
}

/// Validates, checks plugins and submits jobs
pub struct JobPublisher {
    server: Arc<dyn BuildServer>,
    plugins: Arc<PluginRequirements>,
}

impl JobPublisher {
    pub fn new(server: Arc<dyn BuildServer>, plugins: Arc<PluginRequirements>) -> Self {
        Self { server, plugins }
    }

    pub async fn publish(
        &self,
        name: &str,
        spec: &JobSpec,
        mode: PublishMode,
    ) -> Result<PublishOutcome, PublishError> {
        let name = name.trim();
        if !is_valid_job_name(name) {
            return Err(PublishError::InvalidName(name.to_string()));
        }

        let exists = self.server.job_exists(name).await?;
        if exists && mode == PublishMode::Create {
            info!(job = name, "Job already exists");
            return Ok(PublishOutcome::Duplicate);
        }

        let installed = self.server.installed_plugins().await?;
        let check = self.plugins.check(spec.job_type, &installed);
        if !check.is_satisfied() {
            warn!(job = name, job_type = %spec.job_type, plugins = %check, "Plugin requirements not met");
            return Ok(PublishOutcome::PluginsMissing(check));
        }

        let descriptor = compile(spec)?;
        debug!(job = name, bytes = descriptor.len(), "Submitting descriptor");
        if exists {
            self.server.update_job(name, &descriptor).await?;
            info!(job = name, "Job updated");
            Ok(PublishOutcome::Updated)
        } else {
            self.server.create_job(name, &descriptor).await?;
            info!(job = name, "Job created");
            Ok(PublishOutcome::Created)
        }
    }
}

/// Wraps a report's script in an inline pipeline job
pub fn pipeline_job_from_report(report: &AnalysisReport, repository: &str) -> JobSpec {
    let analysis = &report.analysis;
    let description = format!(
        "Generated pipeline for {}: {} built with {} ({} commands)",
        repository,
        analysis.project_type,
        analysis.build_system,
        analysis.shell_environment.executor()
    );
    JobSpec::new(JobType::Pipeline)
        .with_field(fields::DESCRIPTION, description)
        .with_field(fields::PIPELINE_DEFINITION_TYPE, "script")
        .with_field(fields::PIPELINE_SCRIPT, report.jenkinsfile.clone())
}
