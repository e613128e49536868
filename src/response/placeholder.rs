//! Placeholder detection and README-driven enhancement
//!
//! Generators sometimes answer with template scaffolding or with install
//! steps for manifests the repository does not have. Such reports are
//! rewritten from mined README commands, or replaced by the heuristic
//! fallback when the README yields nothing.

use crate::analysis::heuristics::{self, manifest_commands};
use crate::analysis::{AnalysisContext, AnalysisReport, Provenance};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Template text that marks a script as unfinished
pub const PLACEHOLDER_PHRASES: &[&str] = &[
    "Add your build commands here",
    "Add your test commands here",
    "Add your deployment commands here",
    "echo \"Build completed\"",
    "echo \"Tests completed\"",
    "// Example:",
];

/// Manifests that install commands commonly name
const GROUNDED_MANIFESTS: &[&str] = &[
    "requirements.txt",
    "package.json",
    "pyproject.toml",
    "setup.py",
    "pom.xml",
    "build.gradle",
    "go.mod",
    "Cargo.toml",
    "composer.json",
    "Gemfile",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaceholderFinding {
    /// A template phrase appears in the script or a command
    Phrase { phrase: String },
    /// A command references a manifest missing from the repository
    UngroundedManifest { command: String, manifest: String },
}

impl fmt::Display for PlaceholderFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderFinding::Phrase { phrase } => write!(f, "placeholder text '{}'", phrase),
            PlaceholderFinding::UngroundedManifest { command, manifest } => {
                write!(f, "'{}' names missing {}", command, manifest)
            }
        }
    }
}

fn ungrounded_manifest(command: &str, ctx: &AnalysisContext<'_>) -> Option<&'static str> {
    GROUNDED_MANIFESTS
        .iter()
        .copied()
        .find(|manifest| command.contains(manifest) && !ctx.structure.has_file(manifest))
}

fn install_lines(report: &AnalysisReport) -> Vec<&str> {
    let analysis = &report.analysis;
    analysis
        .install_commands
        .iter()
        .chain(&analysis.build_commands)
        .map(String::as_str)
        .chain(
            report
                .jenkinsfile
                .lines()
                .map(str::trim)
                .filter(|line| line.contains("install")),
        )
        .collect()
}

/// Every reason the report looks like scaffolding rather than a real answer
pub fn find_placeholders(report: &AnalysisReport, ctx: &AnalysisContext<'_>) -> Vec<PlaceholderFinding> {
    let analysis = &report.analysis;
    let mut findings = Vec::new();

    let command_text = analysis
        .install_commands
        .iter()
        .chain(&analysis.build_commands)
        .chain(&analysis.test_commands)
        .chain(&analysis.run_commands)
        .map(String::as_str);
    for phrase in PLACEHOLDER_PHRASES {
        let in_script = report.jenkinsfile.contains(phrase);
        if in_script || command_text.clone().any(|c| c.contains(phrase)) {
            findings.push(PlaceholderFinding::Phrase {
                phrase: phrase.to_string(),
            });
        }
    }

    for line in install_lines(report) {
        if let Some(manifest) = ungrounded_manifest(line, ctx) {
            let finding = PlaceholderFinding::UngroundedManifest {
                command: line.to_string(),
                manifest: manifest.to_string(),
            };
            if !findings.contains(&finding) {
                findings.push(finding);
            }
        }
    }

    findings
}

fn is_flagged(commands: &[String], ctx: &AnalysisContext<'_>) -> bool {
    commands.iter().any(|c| {
        PLACEHOLDER_PHRASES.iter().any(|p| c.contains(p)) || ungrounded_manifest(c, ctx).is_some()
    })
}

/// Rewrites a flagged report from mined commands
///
/// Non-empty README buckets replace their command lists; a flagged list with
/// no README counterpart falls back to the manifest defaults. All other
/// analysis fields are preserved.
pub fn enhance(report: AnalysisReport, ctx: &AnalysisContext<'_>) -> AnalysisReport {
    let mined = &ctx.signals.commands;
    if mined.is_empty() {
        info!("No README commands to enhance with, using heuristic fallback");
        return heuristics::fallback_report(ctx);
    }

    let defaults = manifest_commands(&ctx.signals.profile, ctx.structure);
    let mut analysis = report.analysis;

    let pick = |mined: Vec<String>, current: Vec<String>, default: Vec<String>| {
        if !mined.is_empty() {
            mined
        } else if is_flagged(&current, ctx) {
            default
        } else {
            current
        }
    };

    let install = pick(mined.cleaned_install(), analysis.install_commands, defaults.install);
    let install = install
        .into_iter()
        .filter(|c| ungrounded_manifest(c, ctx).is_none())
        .collect();
    analysis.install_commands = install;
    analysis.build_commands = pick(mined.cleaned_build(), analysis.build_commands, defaults.build);
    analysis.test_commands = pick(Vec::new(), analysis.test_commands, defaults.test);
    analysis.run_commands = pick(mined.cleaned_run(), analysis.run_commands, Vec::new());
    analysis.readme_based = mined.has_run();
    analysis.shell_environment = ctx.dialect;

    let detected: Vec<String> = analysis
        .install_commands
        .iter()
        .chain(&analysis.build_commands)
        .chain(&analysis.run_commands)
        .cloned()
        .collect();
    let explanation = format!(
        "Generated pipeline based on README instructions using {} commands. Detected commands: {}",
        ctx.dialect.executor(),
        detected.join(", ")
    );
    debug!(commands = detected.len(), "Report enhanced from README commands");

    AnalysisReport {
        jenkinsfile: ctx.render_script(&analysis),
        recommendations: heuristics::recommendations(&analysis, ctx.dialect),
        analysis,
        explanation,
        provenance: Provenance::Enhanced,
    }
}

/// Validates a parsed report and enhances it when flagged
pub fn validate_report(report: AnalysisReport, ctx: &AnalysisContext<'_>) -> AnalysisReport {
    if report.provenance == Provenance::Heuristic {
        return report;
    }
    let findings = find_placeholders(&report, ctx);
    if findings.is_empty() {
        return report;
    }
    info!(
        findings = %findings.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        "Generic generator output detected, enhancing"
    );
    enhance(report, ctx)
}
