//! Generator output to [`AnalysisReport`]
//!
//! The cascade never fails: a parsed object is merged over the signal
//! baseline, a bare pipeline script is wrapped in the baseline analysis, and
//! anything else becomes a fully heuristic report.

use super::tolerant_json::{extract_object, Repair};
use crate::analysis::heuristics::{self, signal_analysis};
use crate::analysis::{AnalysisContext, AnalysisReport, BuildAnalysis, Provenance};
use crate::classify::ProjectType;
use crate::signals::{Complexity, DeploymentType};
use crate::stack::BuildSystemId;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Scripts shorter than this are treated as absent
pub const MIN_SCRIPT_CHARS: usize = 50;

const SCRIPT_MARKER: &str = "pipeline {";

const REPORT_KEYS: &[&str] = &[
    "analysis",
    "jenkinsfile",
    "explanation",
    "recommendations",
    "project_type",
    "build_system",
    "build_commands",
    "run_commands",
];

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts a list of strings or a single string
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => return None,
    };
    (!items.is_empty()).then_some(items)
}

fn bool_field(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Overlays generator-provided fields on the baseline
///
/// Missing, empty or ill-typed fields keep the baseline value. The shell
/// dialect always stays the requested one.
pub fn merge_analysis(baseline: BuildAnalysis, fields: &Map<String, Value>) -> BuildAnalysis {
    BuildAnalysis {
        project_type: non_empty_str(fields.get("project_type"))
            .map(ProjectType::new)
            .unwrap_or(baseline.project_type),
        build_system: non_empty_str(fields.get("build_system"))
            .map(|s| BuildSystemId::from_tag(&s))
            .unwrap_or(baseline.build_system),
        dependencies: string_list(fields.get("dependencies")).unwrap_or(baseline.dependencies),
        test_framework: non_empty_str(fields.get("test_framework"))
            .unwrap_or(baseline.test_framework),
        deployment_type: non_empty_str(fields.get("deployment_type"))
            .and_then(|s| DeploymentType::parse(&s))
            .unwrap_or(baseline.deployment_type),
        recommended_tools: string_list(fields.get("recommended_tools"))
            .unwrap_or(baseline.recommended_tools),
        complexity: non_empty_str(fields.get("complexity"))
            .and_then(|s| Complexity::parse(&s))
            .unwrap_or(baseline.complexity),
        install_commands: string_list(fields.get("install_commands"))
            .unwrap_or(baseline.install_commands),
        build_commands: string_list(fields.get("build_commands"))
            .unwrap_or(baseline.build_commands),
        test_commands: string_list(fields.get("test_commands")).unwrap_or(baseline.test_commands),
        run_commands: string_list(fields.get("run_commands")).unwrap_or(baseline.run_commands),
        artifacts: string_list(fields.get("artifacts")).unwrap_or(baseline.artifacts),
        readme_based: bool_field(fields.get("readme_based")).unwrap_or(baseline.readme_based),
        shell_environment: baseline.shell_environment,
    }
}

/// Balanced-brace span starting at the first `pipeline {`
pub fn extract_pipeline_script(text: &str) -> Option<&str> {
    let start = text.find(SCRIPT_MARKER)?;
    let mut depth = 0usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_report_like(object: &Map<String, Value>) -> bool {
    REPORT_KEYS.iter().any(|key| object.contains_key(*key))
}

fn usable_script(script: &str) -> bool {
    script.contains(SCRIPT_MARKER) && script.trim().chars().count() >= MIN_SCRIPT_CHARS
}

fn from_object(
    ctx: &AnalysisContext<'_>,
    object: Map<String, Value>,
    repair: Repair,
) -> AnalysisReport {
    let baseline = signal_analysis(ctx.structure, &ctx.signals, ctx.dialect);
    let analysis = match object.get("analysis") {
        Some(Value::Object(fields)) => merge_analysis(baseline, fields),
        _ => merge_analysis(baseline, &object),
    };

    let jenkinsfile = match non_empty_str(object.get("jenkinsfile")) {
        Some(script) if usable_script(&script) => script,
        _ => {
            debug!("Generator script missing or too short, rendering from analysis");
            ctx.render_script(&analysis)
        }
    };

    let explanation = non_empty_str(object.get("explanation")).unwrap_or_else(|| {
        heuristics::explanation(&analysis, &ctx.signals, ctx.structure, ctx.dialect)
    });
    let recommendations = string_list(object.get("recommendations"))
        .unwrap_or_else(|| heuristics::recommendations(&analysis, ctx.dialect));

    AnalysisReport {
        analysis,
        jenkinsfile,
        explanation,
        recommendations,
        provenance: match repair {
            Repair::None => Provenance::Generator,
            Repair::Applied => Provenance::Repaired,
        },
    }
}

/// Runs the parse and repair cascade over raw generator text
pub fn parse_response(text: &str, ctx: &AnalysisContext<'_>) -> AnalysisReport {
    match extract_object(text) {
        Ok((object, repair)) if is_report_like(&object) => {
            debug!(?repair, "Generator response parsed as JSON");
            return from_object(ctx, object, repair);
        }
        Ok(_) => warn!("Generator JSON carries no analysis fields"),
        Err(e) => warn!(error = %e, "Generator response is not valid JSON"),
    }

    if let Some(script) = extract_pipeline_script(text).filter(|s| usable_script(s)) {
        debug!(chars = script.len(), "Salvaged pipeline script from response");
        let analysis = signal_analysis(ctx.structure, &ctx.signals, ctx.dialect);
        return AnalysisReport {
            explanation: format!(
                "Pipeline script extracted from generator output; analysis derived from repository signals using {} commands.",
                ctx.dialect.executor()
            ),
            recommendations: heuristics::recommendations(&analysis, ctx.dialect),
            analysis,
            jenkinsfile: script.to_string(),
            provenance: Provenance::ExtractedScript,
        };
    }

    warn!("No usable content in generator response, using signal defaults");
    let mut report = heuristics::fallback_report(ctx);
    if report.analysis.readme_based {
        report.analysis.readme_based = false;
        report.jenkinsfile = ctx.render_script(&report.analysis);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ShellDialect;
    use crate::repository::RepositoryStructure;

    fn repo() -> RepositoryStructure {
        let mut structure = RepositoryStructure::default();
        structure
            .key_files
            .insert("requirements.txt".into(), "flask\npytest\n".into());
        structure
    }

    #[test]
    fn test_partial_object_merged_over_baseline() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let text = r#"{"analysis": {"project_type": "Flask API", "build_commands": []}}"#;
        let report = parse_response(text, &ctx);

        assert_eq!(report.provenance, Provenance::Generator);
        assert_eq!(report.analysis.project_type.as_str(), "Flask API");
        assert_eq!(report.analysis.build_system, BuildSystemId::Pip);
        assert_eq!(report.analysis.test_commands, vec!["python -m pytest"]);
        assert!(report.jenkinsfile.starts_with("pipeline {"));
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn test_flat_object_and_lenient_types() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let text = r#"{"deployment_type": "Docker container", "complexity": "HIGH", "run_commands": "python app.py", "readme_based": "yes", "shell_environment": "bat"}"#;
        let report = parse_response(text, &ctx);

        assert_eq!(report.analysis.deployment_type, DeploymentType::Container);
        assert_eq!(report.analysis.complexity, Complexity::Complex);
        assert_eq!(report.analysis.run_commands, vec!["python app.py"]);
        assert!(report.analysis.readme_based);
        assert_eq!(report.analysis.shell_environment, ShellDialect::Posix);
    }

    #[test]
    fn test_repaired_provenance() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let report = parse_response("{\"analysis\": {\"complexity\": \"simple\",},}", &ctx);
        assert_eq!(report.provenance, Provenance::Repaired);
        assert_eq!(report.analysis.complexity, Complexity::Simple);
    }

    #[test]
    fn test_script_salvage() {
        let structure = repo();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let text = "Sure! pipeline { agent any stages { stage('Build') { steps { sh 'make' } } } } trailing";
        let report = parse_response(text, &ctx);

        assert_eq!(report.provenance, Provenance::ExtractedScript);
        assert!(report.jenkinsfile.ends_with("} } } }"));
        assert!(report.jenkinsfile.starts_with("pipeline {"));
    }

    #[test]
    fn test_short_script_falls_back() {
        let mut structure = repo();
        structure.readme = "```\npython app.py\n```".into();
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let report = parse_response("pipeline { }", &ctx);

        assert_eq!(report.provenance, Provenance::Heuristic);
        assert!(!report.analysis.readme_based);
        assert!(report.jenkinsfile.contains("stage('Checkout')"));
    }

    #[test]
    fn test_unbalanced_script_is_absent() {
        assert!(extract_pipeline_script("pipeline { agent any").is_none());
    }
}
