//! Deterministic analysis from repository signals alone
//!
//! Used as the merge baseline for generator output and as the terminal
//! fallback when the generator is unavailable or unusable.

use super::context::AnalysisContext;
use super::types::{AnalysisReport, BuildAnalysis, Provenance};
use crate::classify::{classify_project, ProjectType};
use crate::pipeline::ShellDialect;
use crate::readme::{mine_commands, DetectedCommands};
use crate::repository::RepositoryStructure;
use crate::signals::{extract_build_profile, BuildProfile, DeploymentType};
use crate::stack::BuildSystemId;
use tracing::debug;

/// Dependency count past which caching is recommended
const CACHING_RECOMMENDATION_THRESHOLD: usize = 20;

/// Everything the pure extraction stages derive from a repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepositorySignals {
    pub profile: BuildProfile,
    pub commands: DetectedCommands,
    pub project_type: ProjectType,
}

impl RepositorySignals {
    pub fn collect(structure: &RepositoryStructure) -> Self {
        let profile = extract_build_profile(structure);
        let commands = mine_commands(&structure.readme);
        let project_type = classify_project(structure, &profile);
        debug!(
            project_type = %project_type,
            build_system = %profile.build_system,
            source = %profile.source,
            "Repository signals collected"
        );
        Self {
            profile,
            commands,
            project_type,
        }
    }
}

/// Commands implied by the selected manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestCommands {
    pub install: Vec<String>,
    pub build: Vec<String>,
    pub test: Vec<String>,
    pub artifacts: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn node_commands(profile: &BuildProfile, manager: &str) -> ManifestCommands {
    let mut commands = ManifestCommands {
        install: vec![format!("{} install", manager)],
        artifacts: strings(&["build/**/*", "dist/**/*", "public/**/*"]),
        ..Default::default()
    };
    if profile.scripts.contains_key("build") {
        commands.build.push(format!("{} run build", manager));
    }
    if profile.scripts.contains_key("test") {
        commands.test.push(format!("{} test", manager));
    }
    commands
}

fn python_test(profile: &BuildProfile, runner_prefix: &str) -> Vec<String> {
    if profile.test_framework == "pytest" || profile.depends_on("pytest") {
        vec![format!("{}python -m pytest", runner_prefix)]
    } else {
        vec![format!("{}python -m unittest discover", runner_prefix)]
    }
}

/// Default commands for the profile's build system
pub fn manifest_commands(profile: &BuildProfile, structure: &RepositoryStructure) -> ManifestCommands {
    match &profile.build_system {
        BuildSystemId::Npm => node_commands(profile, "npm"),
        BuildSystemId::Yarn => node_commands(profile, "yarn"),
        BuildSystemId::Pip => {
            let install = if structure.has_file("requirements.txt") {
                "pip install -r requirements.txt"
            } else {
                "pip install ."
            };
            ManifestCommands {
                install: strings(&[install]),
                test: python_test(profile, ""),
                artifacts: strings(&["**/*.py"]),
                ..Default::default()
            }
        }
        BuildSystemId::Setuptools => ManifestCommands {
            install: strings(&["pip install ."]),
            test: python_test(profile, ""),
            artifacts: strings(&["dist/*"]),
            ..Default::default()
        },
        BuildSystemId::Poetry => ManifestCommands {
            install: strings(&["poetry install"]),
            build: strings(&["poetry build"]),
            test: python_test(profile, "poetry run "),
            artifacts: strings(&["dist/*"]),
        },
        BuildSystemId::Maven => ManifestCommands {
            build: strings(&["mvn clean compile", "mvn package"]),
            test: strings(&["mvn test"]),
            artifacts: strings(&["target/*.jar", "target/*.war"]),
            ..Default::default()
        },
        BuildSystemId::Gradle => ManifestCommands {
            build: strings(&["./gradlew build"]),
            test: strings(&["./gradlew test"]),
            artifacts: strings(&["build/libs/*.jar"]),
            ..Default::default()
        },
        BuildSystemId::Go => ManifestCommands {
            install: strings(&["go mod download"]),
            build: strings(&["go build"]),
            test: strings(&["go test ./..."]),
            artifacts: strings(&["*"]),
        },
        BuildSystemId::Cargo => cargo_commands(),
        BuildSystemId::Composer => composer_commands(),
        BuildSystemId::DotNet => dotnet_commands(),
        BuildSystemId::Custom(language) => match language.as_str() {
            "rust" => cargo_commands(),
            "php" => composer_commands(),
            "c#" => dotnet_commands(),
            "python" if structure.has_file("requirements.txt") => ManifestCommands {
                install: strings(&["pip install -r requirements.txt"]),
                test: python_test(profile, ""),
                artifacts: strings(&["**/*.py"]),
                ..Default::default()
            },
            _ => ManifestCommands::default(),
        },
    }
}

fn cargo_commands() -> ManifestCommands {
    ManifestCommands {
        build: strings(&["cargo build --release"]),
        test: strings(&["cargo test"]),
        artifacts: strings(&["target/release/*"]),
        ..Default::default()
    }
}

fn composer_commands() -> ManifestCommands {
    ManifestCommands {
        install: strings(&["composer install"]),
        test: strings(&["./vendor/bin/phpunit"]),
        artifacts: strings(&["**/*.php"]),
        ..Default::default()
    }
}

fn dotnet_commands() -> ManifestCommands {
    ManifestCommands {
        install: strings(&["dotnet restore"]),
        build: strings(&["dotnet build"]),
        test: strings(&["dotnet test"]),
        artifacts: strings(&["bin/**/*"]),
    }
}

fn prefer_mined(mined: Vec<String>, manifest: Vec<String>) -> Vec<String> {
    if mined.is_empty() {
        manifest
    } else {
        mined
    }
}

/// Analysis built only from signals
///
/// README-mined install, build and run commands win over manifest defaults
/// bucket by bucket; test commands always come from the manifest.
pub fn signal_analysis(
    structure: &RepositoryStructure,
    signals: &RepositorySignals,
    dialect: ShellDialect,
) -> BuildAnalysis {
    let profile = &signals.profile;
    let defaults = manifest_commands(profile, structure);
    let mined = &signals.commands;

    BuildAnalysis {
        project_type: signals.project_type.clone(),
        build_system: profile.build_system.clone(),
        dependencies: profile.dependencies.clone(),
        test_framework: profile.test_framework.clone(),
        deployment_type: profile.deployment_type,
        recommended_tools: profile.tools.clone(),
        complexity: profile.complexity,
        install_commands: prefer_mined(mined.cleaned_install(), defaults.install),
        build_commands: prefer_mined(mined.cleaned_build(), defaults.build),
        test_commands: defaults.test,
        run_commands: mined.cleaned_run(),
        artifacts: defaults.artifacts,
        readme_based: mined.has_run(),
        shell_environment: dialect,
    }
}

/// Convenience wrapper collecting signals first
pub fn baseline_analysis(structure: &RepositoryStructure, dialect: ShellDialect) -> BuildAnalysis {
    signal_analysis(structure, &RepositorySignals::collect(structure), dialect)
}

pub fn recommendations(analysis: &BuildAnalysis, dialect: ShellDialect) -> Vec<String> {
    let mut out = vec![
        format!(
            "Review the generated {} pipeline for {} environment",
            analysis.project_type,
            dialect.executor()
        ),
        format!(
            "Verify build commands match your {} configuration",
            analysis.build_system
        ),
    ];
    if analysis.test_framework != crate::signals::profile::UNKNOWN_TEST_FRAMEWORK {
        out.push(format!(
            "Consider adding {} test reporting",
            analysis.test_framework
        ));
    }
    if analysis.deployment_type == DeploymentType::Container {
        out.push("Add Docker build and deployment stages".to_string());
    }
    if analysis.dependencies.len() > CACHING_RECOMMENDATION_THRESHOLD {
        out.push("Consider dependency caching for faster builds".to_string());
    }
    out.push("Add environment-specific configurations if needed".to_string());
    out.push("Test the pipeline in a development environment first".to_string());
    out
}

pub fn explanation(
    analysis: &BuildAnalysis,
    signals: &RepositorySignals,
    structure: &RepositoryStructure,
    dialect: ShellDialect,
) -> String {
    let basis = if structure.readme.trim().is_empty() {
        format!("Based on {} analysis.", signals.profile.source)
    } else {
        "Based on README and dependency file analysis.".to_string()
    };
    format!(
        "Enhanced analysis for {} using {} commands. {}",
        analysis.project_type,
        dialect.executor(),
        basis
    )
}

/// Terminal fallback: a full report with no generator involvement
pub fn fallback_report(ctx: &AnalysisContext<'_>) -> AnalysisReport {
    let analysis = signal_analysis(ctx.structure, &ctx.signals, ctx.dialect);
    let jenkinsfile = ctx.render_script(&analysis);
    debug!(
        readme_based = analysis.readme_based,
        "Synthesized analysis from repository signals"
    );
    AnalysisReport {
        explanation: explanation(&analysis, &ctx.signals, ctx.structure, ctx.dialect),
        recommendations: recommendations(&analysis, ctx.dialect),
        jenkinsfile,
        analysis,
        provenance: Provenance::Heuristic,
    }
}
