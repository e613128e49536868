use super::heuristics::RepositorySignals;
use super::types::BuildAnalysis;
use crate::pipeline::{generate_pipeline_script, ShellDialect, DEFAULT_BRANCH};
use crate::repository::RepositoryStructure;

/// Per-request inputs shared by the prompt, parser and fallback stages
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    pub structure: &'a RepositoryStructure,
    pub signals: RepositorySignals,
    pub dialect: ShellDialect,
    pub repository_url: Option<String>,
    pub branch: String,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(structure: &'a RepositoryStructure, dialect: ShellDialect) -> Self {
        let repository_url = structure
            .metadata
            .clone_url
            .clone()
            .filter(|u| !u.is_empty());
        let branch = if structure.metadata.default_branch.is_empty() {
            DEFAULT_BRANCH.to_string()
        } else {
            structure.metadata.default_branch.clone()
        };
        Self {
            structure,
            signals: RepositorySignals::collect(structure),
            dialect,
            repository_url,
            branch,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        if !branch.trim().is_empty() {
            self.branch = branch;
        }
        self
    }

    pub fn with_repository_url(mut self, url: impl Into<String>) -> Self {
        self.repository_url = Some(url.into());
        self
    }

    pub fn render_script(&self, analysis: &BuildAnalysis) -> String {
        generate_pipeline_script(
            analysis,
            self.dialect,
            self.repository_url.as_deref(),
            Some(&self.branch),
        )
    }
}
