//! Analysis output types

use crate::classify::ProjectType;
use crate::pipeline::ShellDialect;
use crate::signals::{Complexity, DeploymentType};
use crate::stack::BuildSystemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured build description of a repository
///
/// Every field is always populated; empty command lists mean the matching
/// pipeline stage is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildAnalysis {
    pub project_type: ProjectType,
    pub build_system: BuildSystemId,
    pub dependencies: Vec<String>,
    pub test_framework: String,
    pub deployment_type: DeploymentType,
    pub recommended_tools: Vec<String>,
    pub complexity: Complexity,
    #[serde(default)]
    pub install_commands: Vec<String>,
    pub build_commands: Vec<String>,
    pub test_commands: Vec<String>,
    pub run_commands: Vec<String>,
    pub artifacts: Vec<String>,
    pub readme_based: bool,
    pub shell_environment: ShellDialect,
}

/// Which path of the cascade produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Generator output parsed as-is
    Generator,
    /// Generator output parsed after JSON repair
    Repaired,
    /// Only a pipeline script could be salvaged from the output
    ExtractedScript,
    /// Placeholder output rewritten from mined commands
    Enhanced,
    /// No usable generator output; built from repository signals
    Heuristic,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Generator => "generator",
            Provenance::Repaired => "repaired",
            Provenance::ExtractedScript => "extracted-script",
            Provenance::Enhanced => "enhanced",
            Provenance::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result envelope returned for every analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis: BuildAnalysis,
    pub jenkinsfile: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub provenance: Provenance,
}
