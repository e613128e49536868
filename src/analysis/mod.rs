//! Repository analysis: signals, generator orchestration and fallback
//!
//! [`AnalysisService`] is the entry point. It fetches a snapshot, builds an
//! [`AnalysisContext`] and hands it to the [`Orchestrator`], or straight to
//! the heuristic fallback when running offline.

mod context;
pub mod delay;
pub mod heuristics;
mod orchestrator;
pub mod prompt;
mod service;
mod types;

pub use context::AnalysisContext;
pub use delay::{Delay, RecordingDelay, TokioDelay};
pub use heuristics::{baseline_analysis, fallback_report, RepositorySignals};
pub use orchestrator::{
    Orchestrator, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TOTAL_BACKOFF,
};
pub use service::{AnalysisRequest, AnalysisService, ServiceError};
pub use types::{AnalysisReport, BuildAnalysis, Provenance};

use crate::pipeline::UnknownDialect;
use thiserror::Error;

/// Contract violations that abort a request
///
/// Generator and parse failures are recovered internally and never appear
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("unsupported shell environment: {0}")]
    UnsupportedDialect(String),
}

impl From<UnknownDialect> for AnalysisError {
    fn from(err: UnknownDialect) -> Self {
        AnalysisError::UnsupportedDialect(err.0)
    }
}
