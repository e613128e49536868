//! pom.xml and build.gradle[.kts] analysis

use super::{ManifestAnalyzer, ManifestError};
use crate::repository::RepositoryStructure;
use crate::signals::profile::{
    BuildProfile, Complexity, DeploymentType, ProfileSource, UNKNOWN_TEST_FRAMEWORK,
};
use crate::stack::{BuildSystemId, FrameworkId};
use regex::Regex;
use std::sync::OnceLock;

const COMPLEX_DEPENDENCY_THRESHOLD: usize = 20;

fn jvm_profile(
    build_system: BuildSystemId,
    dependencies: Vec<String>,
    manifest: &str,
    spring_boot: bool,
    build_tool: &str,
) -> BuildProfile {
    let lower: Vec<String> = dependencies.iter().map(|d| d.to_lowercase()).collect();
    let test_framework = if lower.iter().any(|d| d.contains("junit")) {
        "junit"
    } else if lower.iter().any(|d| d.contains("testng")) {
        "testng"
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
        deployment_type: DeploymentType::Server,
        source: ProfileSource::Manifest(manifest.to_string()),
        ..Default::default()
    };
    profile.push_tool("Java");
    profile.push_tool(build_tool);
    if spring_boot {
        profile.framework = Some(FrameworkId::SpringBoot);
        profile.push_tool(FrameworkId::SpringBoot.tool_name());
    }
    profile
}

pub struct MavenAnalyzer;

impl ManifestAnalyzer for MavenAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Maven
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["pom.xml"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Java", "Maven"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let doc = roxmltree::Document::parse(content)?;
        let root = doc.root_element();
        if root.tag_name().name() != "project" {
            return Err(ManifestError::Shape(format!(
                "expected <project>, found <{}>",
                root.tag_name().name()
            )));
        }

        let artifact_of = |node: roxmltree::Node| {
            node.children()
                .find(|c| c.has_tag_name("artifactId"))
                .and_then(|c| c.text())
                .map(|t| t.trim().to_string())
        };

        let mut dependencies: Vec<String> = root
            .descendants()
            .filter(|n| n.has_tag_name("dependency"))
            .filter_map(artifact_of)
            .collect();
        dependencies.dedup();

        let parent_is_boot = root
            .children()
            .find(|n| n.has_tag_name("parent"))
            .and_then(artifact_of)
            .is_some_and(|a| a.starts_with("spring-boot"));
        let plugin_is_boot = root
            .descendants()
            .filter(|n| n.has_tag_name("plugin"))
            .filter_map(artifact_of)
            .any(|a| a.starts_with("spring-boot"));
        let spring_boot = parent_is_boot
            || plugin_is_boot
            || dependencies.iter().any(|d| d.starts_with("spring-boot"));

        Ok(jvm_profile(
            BuildSystemId::Maven,
            dependencies,
            "pom.xml",
            spring_boot,
            "Maven",
        ))
    }
}

pub struct GradleAnalyzer;

fn gradle_dependency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(?:implementation|api|compileOnly|runtimeOnly|testImplementation|testRuntimeOnly|annotationProcessor|kapt|compile|testCompile)\s*\(?\s*["']([^"']+)["']"#,
        )
        .unwrap()
    })
}

impl ManifestAnalyzer for GradleAnalyzer {
    fn build_system(&self) -> BuildSystemId {
        BuildSystemId::Gradle
    }

    fn manifest_names(&self) -> &[&'static str] {
        &["build.gradle", "build.gradle.kts"]
    }

    fn minimal_tools(&self) -> &[&'static str] {
        &["Java", "Gradle"]
    }

    fn analyze(
        &self,
        content: &str,
        _structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError> {
        let mut dependencies: Vec<String> = gradle_dependency_regex()
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|coordinate| {
                // group:artifact:version -> artifact
                let parts: Vec<&str> = coordinate.as_str().split(':').collect();
                match parts.as_slice() {
                    [_, artifact, ..] => artifact.to_string(),
                    _ => coordinate.as_str().to_string(),
                }
            })
            .collect();
        dependencies.dedup();

        let spring_boot = content.contains("org.springframework.boot")
            || dependencies.iter().any(|d| d.starts_with("spring-boot"));

        Ok(jvm_profile(
            BuildSystemId::Gradle,
            dependencies,
            "build.gradle",
            spring_boot,
            "Gradle",
        ))
    }
}
