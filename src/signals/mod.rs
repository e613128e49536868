//! Signal extraction: dependency manifests to a [`BuildProfile`]
//!
//! Manifests are tried in a fixed order and only the first one present is
//! analyzed. Docker manifests are checked independently and only adjust the
//! deployment type and tool list.

pub mod manifests;
pub mod profile;

pub use manifests::{ManifestAnalyzer, ManifestError};
pub use profile::{BuildProfile, Complexity, DeploymentType, ProfileSource};

use crate::repository::RepositoryStructure;
use crate::stack::BuildSystemId;
use manifests::cargo::CargoAnalyzer;
use manifests::go_mod::GoModAnalyzer;
use manifests::jvm::{GradleAnalyzer, MavenAnalyzer};
use manifests::npm::NpmAnalyzer;
use manifests::python::{PyprojectAnalyzer, RequirementsAnalyzer, SetupPyAnalyzer};
use tracing::{debug, warn};

const DOCKER_MANIFESTS: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];

/// Ordered set of manifest analyzers
pub struct ManifestRegistry {
    analyzers: Vec<Box<dyn ManifestAnalyzer>>,
}

impl ManifestRegistry {
    /// Analyzers in selection priority order
    pub fn with_defaults() -> Self {
        Self {
            analyzers: vec![
                Box::new(NpmAnalyzer),
                Box::new(RequirementsAnalyzer),
                Box::new(PyprojectAnalyzer),
                Box::new(SetupPyAnalyzer),
                Box::new(MavenAnalyzer),
                Box::new(GradleAnalyzer),
                Box::new(GoModAnalyzer),
                Box::new(CargoAnalyzer),
            ],
        }
    }

    pub fn analyzers(&self) -> &[Box<dyn ManifestAnalyzer>] {
        &self.analyzers
    }

    /// Every manifest file name the registry knows about
    pub fn manifest_names(&self) -> Vec<&'static str> {
        self.analyzers
            .iter()
            .flat_map(|a| a.manifest_names().iter().copied())
            .collect()
    }

    pub fn extract(&self, structure: &RepositoryStructure) -> BuildProfile {
        let mut profile = self.select_manifest(structure).unwrap_or_else(|| {
            let mut fallback = language_fallback(structure);
            debug!(
                build_system = %fallback.build_system,
                "No manifest found, using language histogram"
            );
            fallback.source = ProfileSource::FileStructure;
            fallback
        });

        if DOCKER_MANIFESTS.iter().any(|name| structure.has_file(name)) {
            debug!("Docker manifest present, deployment type set to container");
            profile.deployment_type = DeploymentType::Container;
            profile.push_tool("Docker");
        }

        profile
    }

    fn select_manifest(&self, structure: &RepositoryStructure) -> Option<BuildProfile> {
        for analyzer in &self.analyzers {
            let Some((file, content)) = analyzer.find_manifest(structure) else {
                continue;
            };

            let profile = match analyzer.analyze(content, structure) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(manifest = %file, error = %e, "Manifest analysis failed, degrading");
                    analyzer.degraded()
                }
            };
            debug!(manifest = %file, build_system = %profile.build_system, "Manifest selected");

            return Some(BuildProfile {
                source: ProfileSource::Manifest(file),
                ..profile
            });
        }
        None
    }
}

impl Default for ManifestRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn language_fallback(structure: &RepositoryStructure) -> BuildProfile {
    let build_system = structure
        .languages
        .dominant()
        .map(|lang| BuildSystemId::Custom(lang.to_lowercase()))
        .unwrap_or_else(BuildSystemId::custom);

    BuildProfile {
        build_system,
        dependencies: structure.languages.ranked(),
        ..Default::default()
    }
}

/// Extracts the build profile with the default analyzer set
pub fn extract_build_profile(structure: &RepositoryStructure) -> BuildProfile {
    ManifestRegistry::with_defaults().extract(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FileEntry, LanguageHistogram};
    use crate::stack::FrameworkId;

    fn structure_with(files: &[(&str, &str)]) -> RepositoryStructure {
        let mut structure = RepositoryStructure::default();
        for (name, content) in files {
            structure
                .key_files
                .insert(name.to_string(), content.to_string());
            structure
                .files
                .push(FileEntry::new(*name, content.len() as u64));
        }
        structure
    }

    #[test]
    fn test_package_json_wins_over_requirements() {
        let structure = structure_with(&[
            ("requirements.txt", "flask\n"),
            ("package.json", r#"{"dependencies": {"vue": "3"}}"#),
        ]);
        let profile = extract_build_profile(&structure);
        assert_eq!(profile.build_system, BuildSystemId::Npm);
        assert_eq!(profile.framework, Some(FrameworkId::Vue));
        assert_eq!(
            profile.source,
            ProfileSource::Manifest("package.json".to_string())
        );
    }

    #[test]
    fn test_malformed_manifest_degrades() {
        let structure = structure_with(&[("package.json", "{ broken")]);
        let profile = extract_build_profile(&structure);
        assert_eq!(profile.build_system, BuildSystemId::Npm);
        assert!(profile.dependencies.is_empty());
        assert_eq!(profile.tools, vec!["Node.js"]);
        assert!(profile.source.is_manifest());
    }

    #[test]
    fn test_docker_sets_container_deployment() {
        let structure = structure_with(&[
            ("requirements.txt", "flask\n"),
            ("Dockerfile", "FROM python:3.12\n"),
        ]);
        let profile = extract_build_profile(&structure);
        assert_eq!(profile.deployment_type, DeploymentType::Container);
        assert!(profile.tools.contains(&"Docker".to_string()));
    }

    #[test]
    fn test_language_fallback() {
        let mut structure = RepositoryStructure::default();
        structure.languages = vec![("Python".to_string(), 1000), ("Shell".to_string(), 10)]
            .into_iter()
            .collect::<LanguageHistogram>();

        let profile = extract_build_profile(&structure);
        assert_eq!(profile.build_system, BuildSystemId::Custom("python".to_string()));
        assert_eq!(profile.dependencies, vec!["Python", "Shell"]);
        assert_eq!(profile.source, ProfileSource::FileStructure);
    }

    #[test]
    fn test_empty_structure_is_custom() {
        let profile = extract_build_profile(&RepositoryStructure::default());
        assert_eq!(profile.build_system.as_str(), "custom");
        assert!(profile.dependencies.is_empty());
    }

    #[test]
    fn test_manifest_lookup_is_case_insensitive() {
        let structure = structure_with(&[("cargo.toml", "[package]\nname = \"x\"\n")]);
        let profile = extract_build_profile(&structure);
        assert_eq!(profile.build_system, BuildSystemId::Cargo);
        assert_eq!(
            profile.source,
            ProfileSource::Manifest("cargo.toml".to_string())
        );
    }
}
