//! requirements.txt, pyproject.toml and setup.py analysis

use super::{requirement_name, ManifestAnalyzer, ManifestError};
use crate::repository::RepositoryStructure;
use crate::signals::profile::{
    BuildProfile, Complexity, DeploymentType, ProfileSource, UNKNOWN_TEST_FRAMEWORK,
};
use crate::stack::{BuildSystemId, FrameworkId};
use regex::Regex;
use std::sync::OnceLock;

const COMPLEX_DEPENDENCY_THRESHOLD: usize = 15;

/// Shared framework/test inference for every Python manifest flavour
fn python_profile(
    build_system: BuildSystemId,
    dependencies: Vec<String>,
    manifest: &str,
    base_tools: &[&str],
) -> BuildProfile {
    let lower: Vec<String> = dependencies.iter().map(|d| d.to_lowercase()).collect();
    let has = |name: &str| lower.iter().any(|d| d == name);

    let framework = if has("django") {
        Some(FrameworkId::Django)
    } else if has("flask") {
        Some(FrameworkId::Flask)
    } else if has("fastapi") {
        Some(FrameworkId::FastApi)
    } else {
        None
    };

    let test_framework = if has("pytest") {
        "pytest"
    } else if has("unittest") || has("nose") || has("unittest2") {
        "unittest"
    } else {
        UNKNOWN_TEST_FRAMEWORK
    };

    let mut profile = BuildProfile {
        build_system,
        complexity: Complexity::from_dependency_count(
            dependencies.len(),
            COMPLEX_DEPENDENCY_THRESHOLD,
        ),
        dependencies,
        test_framework: test_framework.to_string(),
        deployment_type: if framework.is_some() {
            DeploymentType::Server
        } else {
            DeploymentType::Script
        },
        source: ProfileSource::Manifest(manifest.to_string()),
        ..Default::default()
    };
    for tool in base_tools {
        profile.push_tool(*tool);
    }
    if let Some(fw) = &framework {
        profile.push_tool(fw.tool_name());
    }
    profile.framework = framework;
    profile
}

pub struct RequirementsAnalyzer;

impl ManifestAnalyzer for RequirementsAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Pip
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["requirements.txt"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Python"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let dependencies = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(requirement_name)
            .collect();

        Ok(python_profile(
            BuildSystemId::Pip,
            dependencies,
            "requirements.txt",
            &["Python"],
        ))
    }
}

pub struct PyprojectAnalyzer;

impl PyprojectAnalyzer {
    fn table_keys(value: Option<&toml::Value>) -> Vec<String> {
        value
            .and_then(toml::Value::as_table)
            .map(|table| {
                table
                    .keys()
                    .filter(|key| !key.eq_ignore_ascii_case("python"))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn requirement_list(value: Option<&toml::Value>) -> Vec<String> {
        value
            .and_then(toml::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(toml::Value::as_str)
                    .filter_map(requirement_name)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ManifestAnalyzer for PyprojectAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Poetry
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["pyproject.toml"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Python", "Poetry"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let doc: toml::Value = toml::from_str(content)?;
        let poetry = doc.get("tool").and_then(|tool| tool.get("poetry"));

        let mut dependencies = Vec::new();
        if let Some(poetry) = poetry {
            dependencies.extend(Self::table_keys(poetry.get("dependencies")));
            dependencies.extend(Self::table_keys(poetry.get("dev-dependencies")));
            if let Some(groups) = poetry.get("group").and_then(toml::Value::as_table) {
                for group in groups.values() {
                    dependencies.extend(Self::table_keys(group.get("dependencies")));
                }
            }
        }
        if let Some(project) = doc.get("project") {
            dependencies.extend(Self::requirement_list(project.get("dependencies")));
            if let Some(optional) = project
                .get("optional-dependencies")
                .and_then(toml::Value::as_table)
            {
                for extra in optional.values() {
                    dependencies.extend(Self::requirement_list(Some(extra)));
                }
            }
        }
        dependencies.dedup();

        let backend_is_poetry = doc
            .get("build-system")
            .and_then(|bs| bs.get("build-backend"))
            .and_then(toml::Value::as_str)
            .is_some_and(|backend| backend.contains("poetry"));

        if poetry.is_some() || backend_is_poetry {
            Ok(python_profile(
                BuildSystemId::Poetry,
                dependencies,
                "pyproject.toml",
                &["Python", "Poetry"],
            ))
        } else {
            Ok(python_profile(
                BuildSystemId::Pip,
                dependencies,
                "pyproject.toml",
                &["Python"],
            ))
        }
    }
}

pub struct SetupPyAnalyzer;

fn install_requires_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)install_requires\s*=\s*\[(.*?)\]").unwrap())
}

fn quoted_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).unwrap())
}

impl ManifestAnalyzer for SetupPyAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Setuptools
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["setup.py"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Python", "Setuptools"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let dependencies = install_requires_regex()
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|list| {
                quoted_string_regex()
                    .captures_iter(list.as_str())
                    .filter_map(|c| c.get(1))
                    .filter_map(|m| requirement_name(m.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(python_profile(
            BuildSystemId::Setuptools,
            dependencies,
            "setup.py",
            &["Python", "Setuptools"],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_django_pytest() {
        let profile = RequirementsAnalyzer
            .analyze(
                "django==4.0\npytest==7.0\n",
                &RepositoryStructure::default(),
            )
            .unwrap();

        assert_eq!(profile.build_system, BuildSystemId::Pip);
        assert_eq!(profile.test_framework, "pytest");
        assert_eq!(profile.framework, Some(FrameworkId::Django));
        assert_eq!(profile.deployment_type, DeploymentType::Server);
        assert_eq!(profile.dependencies, vec!["django", "pytest"]);
    }

    #[test]
    fn test_requirements_skip_comments_and_options() {
        let profile = RequirementsAnalyzer
            .analyze(
                "# web\nrequests>=2\n\n-r dev.txt\nnumpy\n",
                &RepositoryStructure::default(),
            )
            .unwrap();
        assert_eq!(profile.dependencies, vec!["requests", "numpy"]);
        assert_eq!(profile.deployment_type, DeploymentType::Script);
        assert_eq!(profile.tools, vec!["Python"]);
    }

    #[test]
    fn test_requirements_complexity_threshold() {
        let content: String = (0..16).map(|i| format!("pkg{i}\n")).collect();
        let profile = RequirementsAnalyzer
            .analyze(&content, &RepositoryStructure::default())
            .unwrap();
        assert_eq!(profile.complexity, Complexity::Complex);
    }

    #[test]
    fn test_pyproject_poetry() {
        let content = r#"
[tool.poetry]
name = "svc"

[tool.poetry.dependencies]
python = "^3.11"
fastapi = "^0.110"

[tool.poetry.group.dev.dependencies]
pytest = "^8"
"#;
        let profile = PyprojectAnalyzer
            .analyze(content, &RepositoryStructure::default())
            .unwrap();
        assert_eq!(profile.build_system, BuildSystemId::Poetry);
        assert_eq!(profile.framework, Some(FrameworkId::FastApi));
        assert_eq!(profile.test_framework, "pytest");
        assert!(!profile.depends_on("python"));
    }

    #[test]
    fn test_pyproject_pep621_uses_pip() {
        let content = r#"
[project]
name = "tool"
dependencies = ["flask>=3", "click"]

[build-system]
build-backend = "hatchling.build"
"#;
        let profile = PyprojectAnalyzer
            .analyze(content, &RepositoryStructure::default())
            .unwrap();
        assert_eq!(profile.build_system, BuildSystemId::Pip);
        assert_eq!(profile.dependencies, vec!["flask", "click"]);
        assert_eq!(profile.framework, Some(FrameworkId::Flask));
    }

    #[test]
    fn test_pyproject_invalid_toml() {
        let result =
            PyprojectAnalyzer.analyze("[tool.poetry\nname=", &RepositoryStructure::default());
        assert!(matches!(result, Err(ManifestError::Toml(_))));
    }

    #[test]
    fn test_setup_py_install_requires() {
        let content = r#"
from setuptools import setup
setup(
    name="lib",
    install_requires=[
        "requests>=2.0",
        'nose',
    ],
)
"#;
        let profile = SetupPyAnalyzer
            .analyze(content, &RepositoryStructure::default())
            .unwrap();
        assert_eq!(profile.build_system, BuildSystemId::Setuptools);
        assert_eq!(profile.dependencies, vec!["requests", "nose"]);
        assert_eq!(profile.test_framework, "unittest");
    }
}
