//! Cargo.toml analysis

use super::{ManifestAnalyzer, ManifestError};
use crate::repository::RepositoryStructure;
use crate::signals::profile::{BuildProfile, Complexity, DeploymentType, ProfileSource};
use crate::stack::BuildSystemId;

const SERVER_CRATES: &[&str] = &["actix-web", "axum", "rocket", "warp", "hyper", "tonic"];

pub struct CargoAnalyzer;

fn table_keys(doc: &toml::Value, path: &[&str]) -> Vec<String> {
    let mut node = Some(doc);
    for key in path {
        node = node.and_then(|n| n.get(*key));
    }
    node.and_then(toml::Value::as_table)
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default()
}

impl ManifestAnalyzer for CargoAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Cargo
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["Cargo.toml"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Rust", "Cargo"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let doc: toml::Value = toml::from_str(content)?;
        if doc.get("package").is_none() && doc.get("workspace").is_none() {
            return Err(ManifestError::Shape(
                "Cargo.toml has neither [package] nor [workspace]".to_string(),
            ));
        }

        let mut dependencies = table_keys(&doc, &["dependencies"]);
        dependencies.extend(table_keys(&doc, &["dev-dependencies"]));
        dependencies.extend(table_keys(&doc, &["workspace", "dependencies"]));
        dependencies.dedup();

        let serves = dependencies
            .iter()
            .any(|d| SERVER_CRATES.contains(&d.as_str()));

        Ok(BuildProfile {
            build_system: BuildSystemId::Cargo,
            complexity: Complexity::from_dependency_count(dependencies.len(), 20),
            dependencies,
            test_framework: "cargo-test".to_string(),
            deployment_type: if serves {
                DeploymentType::Server
            } else {
                DeploymentType::Script
            },
            tools: vec!["Rust".to_string(), "Cargo".to_string()],
            source: ProfileSource::Manifest("Cargo.toml".to_string()),
            ..Default::default()
        })
    }
}
