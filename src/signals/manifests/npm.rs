//! package.json analysis

use super::{ManifestAnalyzer, ManifestError};
use crate::repository::RepositoryStructure;
use crate::signals::profile::{BuildProfile, Complexity, DeploymentType, ProfileSource};
use crate::stack::{BuildSystemId, FrameworkId};
use serde_json::Value;

const COMPLEX_DEPENDENCY_THRESHOLD: usize = 20;

/// Framework markers, first match wins
const FRAMEWORK_MARKERS: &[(FrameworkId, &[&str])] = &[
    (FrameworkId::React, &["react", "@types/react"]),
    (FrameworkId::Vue, &["vue", "@vue/cli"]),
    (FrameworkId::Angular, &["@angular/core", "@angular/cli"]),
    (FrameworkId::NextJs, &["next", "@next/core"]),
    (FrameworkId::Express, &["express"]),
];

/// Test framework markers, looked up in devDependencies only
const TEST_MARKERS: &[(&str, &[&str])] = &[
    ("jest", &["jest", "@jest/core"]),
    ("mocha", &["mocha", "chai"]),
    ("cypress", &["cypress", "@cypress/core"]),
];

pub struct NpmAnalyzer;

fn object_keys(pkg: &Value, field: &str) -> Vec<String> {
    pkg.get(field)
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

impl ManifestAnalyzer for NpmAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Npm
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["package.json"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Node.js"]
    }

    fn analyze(
        &self,
        content: &str,
        structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let pkg: Value = serde_json::from_str(content)?;
        if !pkg.is_object() {
            return Err(ManifestError::Shape(
                "package.json root is not an object".to_string(),
            ));
        }

        let runtime = object_keys(&pkg, "dependencies");
        let dev = object_keys(&pkg, "devDependencies");
        let scripts = pkg
            .get("scripts")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let all: Vec<&String> = runtime.iter().chain(dev.iter()).collect();
        let framework = FRAMEWORK_MARKERS
            .iter()
            .find(|(_, markers)| all.iter().any(|dep| markers.contains(&dep.as_str())))
            .map(|(id, _)| id.clone());

        let test_framework = TEST_MARKERS
            .iter()
            .find(|(_, markers)| dev.iter().any(|dep| markers.contains(&dep.as_str())))
            .map(|(tag, _)| tag.to_string())
            .unwrap_or_else(|| crate::signals::profile::UNKNOWN_TEST_FRAMEWORK.to_string());

        let uses_yarn = structure.has_file("yarn.lock")
            || pkg
                .pointer("/scripts/install")
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains("yarn"));

        let deployment_type = match &framework {
            Some(fw) if fw.is_static_frontend() => DeploymentType::Static,
            _ => DeploymentType::Server,
        };

        let mut tools = vec!["Node.js".to_string()];
        tools.push(
            framework
                .as_ref()
                .map(FrameworkId::tool_name)
                .unwrap_or_else(|| "Node".to_string()),
        );

        let complexity =
            Complexity::from_dependency_count(runtime.len(), COMPLEX_DEPENDENCY_THRESHOLD);

        let mut dependencies = runtime;
        dependencies.extend(dev);

        Ok(BuildProfile {
            build_system: if uses_yarn {
                BuildSystemId::Yarn
            } else {
                BuildSystemId::Npm
            },
            dependencies,
            scripts,
            test_framework,
            deployment_type,
            tools,
            complexity,
            source: ProfileSource::Manifest("package.json".to_string()),
            framework,
        })
    }
}
