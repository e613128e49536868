use crate::stack::{BuildSystemId, FrameworkId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How the built project is expected to be shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    Static,
    Server,
    Container,
    Script,
}

impl DeploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Static => "static",
            DeploymentType::Server => "server",
            DeploymentType::Container => "container",
            DeploymentType::Script => "script",
        }
    }

    /// Lenient parse used when reading generator output
    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        if lower.contains("container") || lower.contains("docker") {
            Some(DeploymentType::Container)
        } else if lower.contains("static") {
            Some(DeploymentType::Static)
        } else if lower.contains("server") || lower.contains("service") {
            Some(DeploymentType::Server)
        } else if lower.contains("script") {
            Some(DeploymentType::Script)
        } else {
            None
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "simple" | "low" => Some(Complexity::Simple),
            "moderate" | "medium" => Some(Complexity::Moderate),
            "complex" | "high" => Some(Complexity::Complex),
            _ => None,
        }
    }

    /// `Complex` past the threshold, `Moderate` otherwise
    pub fn from_dependency_count(count: usize, threshold: usize) -> Self {
        if count > threshold {
            Complexity::Complex
        } else {
            Complexity::Moderate
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which input produced a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "file", rename_all = "snake_case")]
pub enum ProfileSource {
    /// A dependency manifest, named as it appears in the repository
    Manifest(String),
    /// No manifest matched; derived from the language histogram
    FileStructure,
}

impl ProfileSource {
    pub fn is_manifest(&self) -> bool {
        matches!(self, ProfileSource::Manifest(_))
    }
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::Manifest(file) => f.write_str(file),
            ProfileSource::FileStructure => f.write_str("file_structure"),
        }
    }
}

/// Test framework tag used when nothing was detected
pub const UNKNOWN_TEST_FRAMEWORK: &str = "unknown";

/// Normalized summary of the one manifest selected for a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildProfile {
    pub build_system: BuildSystemId,
    pub dependencies: Vec<String>,
    /// Manifest-declared scripts (package.json `scripts`)
    pub scripts: BTreeMap<String, String>,
    pub test_framework: String,
    pub deployment_type: DeploymentType,
    pub tools: Vec<String>,
    pub complexity: Complexity,
    pub source: ProfileSource,
    pub framework: Option<FrameworkId>,
}

impl Default for BuildProfile {
    fn default() -> Self {
        Self {
            build_system: BuildSystemId::custom(),
            dependencies: Vec::new(),
            scripts: BTreeMap::new(),
            test_framework: UNKNOWN_TEST_FRAMEWORK.to_string(),
            deployment_type: DeploymentType::Static,
            tools: Vec::new(),
            complexity: Complexity::Moderate,
            source: ProfileSource::FileStructure,
            framework: None,
        }
    }
}

impl BuildProfile {
    /// Empty-but-valid profile carrying only the build system and tools
    pub fn minimal(build_system: BuildSystemId, tools: &[&str]) -> Self {
        Self {
            build_system,
            tools: tools.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn has_test_framework(&self) -> bool {
        self.test_framework != UNKNOWN_TEST_FRAMEWORK
    }

    /// Adds a tool unless already listed
    pub fn push_tool(&mut self, tool: impl Into<String>) {
        let tool = tool.into();
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
    }

    /// Case-insensitive dependency membership
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|dep| dep.eq_ignore_ascii_case(name))
    }
}
