//! go.mod analysis

use super::{ManifestAnalyzer, ManifestError};
use crate::repository::RepositoryStructure;
use crate::signals::profile::{BuildProfile, Complexity, DeploymentType, ProfileSource};
use crate::stack::BuildSystemId;

pub struct GoModAnalyzer;

impl GoModAnalyzer {
    fn parse_requires(content: &str) -> Result<Vec<String>, ManifestError> {
        let mut requires = Vec::new();
        let mut in_block = false;
        let mut saw_module = false;

        for raw in content.lines() {
            let line = raw.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("module ") {
                saw_module = true;
                continue;
            }
            if in_block {
                if line == ")" {
                    in_block = false;
                } else if let Some(path) = line.split_whitespace().next() {
                    requires.push(path.to_string());
                }
                continue;
            }
            if let Some(rest) = line.strip_prefix("require") {
                let rest = rest.trim();
                if rest == "(" {
                    in_block = true;
                } else if let Some(path) = rest.split_whitespace().next() {
                    requires.push(path.to_string());
                }
            }
        }

        if !saw_module {
            return Err(ManifestError::Shape(
                "go.mod has no module directive".to_string(),
            ));
        }
        Ok(requires)
    }
}

impl ManifestAnalyzer for GoModAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Go
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["go.mod"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Go"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let dependencies = Self::parse_requires(content)?;
        Ok(BuildProfile {
            build_system: BuildSystemId::Go,
            complexity: Complexity::from_dependency_count(dependencies.len(), 20),
            dependencies,
            test_framework: "go-test".to_string(),
            deployment_type: DeploymentType::Server,
            tools: vec!["Go".to_string()],
            source: ProfileSource::Manifest("go.mod".to_string()),
            ..Default::default()
        })
    }
}
