//! pipeforge - CI pipeline synthesis from repository signals
//!
//! Given a repository (GitHub or a local checkout) the library produces a
//! structured [`BuildAnalysis`] and a declarative pipeline script. A text
//! generator does the heavy lifting; when it is rate limited, unavailable or
//! returns something unusable, the report is rebuilt from manifest and README
//! signals, so every request yields a usable pipeline.
//!
//! # Example Usage
//!
//! ```ignore
//! use pipeforge::{AnalysisRequest, AnalysisService, GitHubSource};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! async fn analyze() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = GitHubSource::new(None, Duration::from_secs(30))?;
//!     let service = AnalysisService::new(Arc::new(source));
//!     let report = service
//!         .analyze(&AnalysisRequest::new("octo", "demo").with_shell("posix"))
//!         .await?;
//!     println!("{}", report.jenkinsfile);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`repository`]: snapshot model plus GitHub and local sources
//! - [`signals`], [`readme`], [`classify`]: deterministic repository signals
//! - [`analysis`]: prompt, retry cascade and heuristic fallback
//! - [`response`]: tolerant parsing and placeholder enhancement of generator output
//! - [`pipeline`]: shell dialects and pipeline script rendering
//! - [`jobs`]: build-server job descriptors, plugin checks and publishing
//! - [`llm`]: text generator abstraction

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod jobs;
pub mod llm;
pub mod pipeline;
pub mod readme;
pub mod repository;
pub mod response;
pub mod signals;
pub mod stack;
pub mod util;

pub use analysis::{
    AnalysisError, AnalysisReport, AnalysisRequest, AnalysisService, BuildAnalysis, Provenance,
    RetryPolicy, ServiceError,
};
pub use config::{ConfigError, PipeforgeConfig};
pub use jobs::{compile, CompileError, JobPublisher, JobSpec, JobType};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient};
pub use pipeline::ShellDialect;
pub use repository::{FetchError, GitHubSource, LocalSource, RepositorySource};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "pipeforge");
    }
}
