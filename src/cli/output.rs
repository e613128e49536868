//! Output formatting for analysis reports, job specs, models and configuration
//!
//! JSON and YAML are machine-readable renderings of the same serde types the
//! library returns. The human format is a sectioned summary, and the
//! `jenkinsfile` format prints only the generated pipeline script.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::AnalysisReport;
use crate::config::PipeforgeConfig;
use crate::jobs::JobSpec;
use crate::llm::models::{ModelInfo, FALLBACK_MODELS};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
    /// The pipeline script alone
    Jenkinsfile,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "analysis report"),
            OutputFormat::Yaml => to_yaml(report, "analysis report"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
            OutputFormat::Jenkinsfile => Ok(format!("{}\n", report.jenkinsfile.trim_end())),
        }
    }

    pub fn format_job_spec(&self, spec: &JobSpec) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(spec, "job specification"),
            OutputFormat::Yaml => to_yaml(spec, "job specification"),
            OutputFormat::Human | OutputFormat::Jenkinsfile => {
                bail!("job specifications can only be written as json or yaml")
            }
        }
    }

    pub fn format_models(&self, models: &[ModelInfo], default_model: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(models, "model list"),
            OutputFormat::Yaml => to_yaml(models, "model list"),
            OutputFormat::Human => Ok(format_models_human(models, default_model)),
            OutputFormat::Jenkinsfile => bail!("the jenkinsfile format only applies to analyze"),
        }
    }

    pub fn format_config(&self, config: &PipeforgeConfig) -> Result<String> {
        let map = config.to_display_map();
        match self.format {
            OutputFormat::Json => to_json(&map, "configuration"),
            OutputFormat::Yaml => to_yaml(&map, "configuration"),
            OutputFormat::Human => Ok(format_config_human(&map)),
            OutputFormat::Jenkinsfile => bail!("the jenkinsfile format only applies to analyze"),
        }
    }

    fn format_report_human(&self, report: &AnalysisReport) -> String {
        let analysis = &report.analysis;
        let mut output = String::new();

        output.push_str("\u{2713} Pipeline Analysis\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Project Type:  {}\n", analysis.project_type));
        output.push_str(&format!("Build System:  {}\n", analysis.build_system));
        output.push_str(&format!("Shell:         {}\n", analysis.shell_environment));
        output.push_str(&format!("Complexity:    {}\n", analysis.complexity));
        output.push_str(&format!("Deployment:    {}\n", analysis.deployment_type));
        output.push_str(&format!("Test Framework: {}\n", analysis.test_framework));
        output.push_str(&format!("Source:        {}\n\n", report.provenance));

        output.push_str("Commands:\n");
        let buckets = [
            ("Install", &analysis.install_commands),
            ("Build", &analysis.build_commands),
            ("Test", &analysis.test_commands),
            ("Run", &analysis.run_commands),
        ];
        for (i, (label, commands)) in buckets.iter().enumerate() {
            let connector = if i == buckets.len() - 1 { "\u{2514}" } else { "\u{251C}" };
            let rendered = if commands.is_empty() {
                "(none)".to_string()
            } else {
                commands.join(" && ")
            };
            output.push_str(&format!("{}\u{2500} {:<8} {}\n", connector, format!("{label}:"), rendered));
        }
        if analysis.readme_based {
            output.push_str("   (commands taken from the README)\n");
        }
        output.push('\n');

        push_list(&mut output, "Dependencies", &analysis.dependencies);
        push_list(&mut output, "Artifacts", &analysis.artifacts);
        push_list(&mut output, "Recommended Tools", &analysis.recommended_tools);

        if !report.recommendations.is_empty() {
            output.push_str("Recommendations:\n");
            for recommendation in &report.recommendations {
                output.push_str(&format!("  - {}\n", recommendation));
            }
            output.push('\n');
        }

        output.push_str(&format!("Explanation: {}\n\n", report.explanation));
        output.push_str("Pipeline:\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(report.jenkinsfile.trim_end());
        output.push('\n');
        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {what} to JSON"))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {what} to YAML"))
}

fn push_list(output: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("{}: {}\n", title, items.join(", ")));
}

fn format_models_human(models: &[ModelInfo], default_model: &str) -> String {
    let mut output = String::from("Supported Models\n");
    output.push_str(RULE);
    output.push_str("\n\n");
    for model in models {
        let mut tags = Vec::new();
        if model.name == default_model {
            tags.push("default");
        }
        if FALLBACK_MODELS.contains(&model.name) {
            tags.push("fallback");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        output.push_str(&format!(
            "  {:<24} {:<4} {}{}\n",
            model.name,
            model.tier.as_str(),
            model.description,
            tags
        ));
    }
    output
}

fn format_config_human(map: &BTreeMap<String, String>) -> String {
    let mut output = String::from("pipeforge Configuration\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str("Generator:\n");
    for (key, label) in [("provider", "Provider"), ("model", "Model")] {
        if let Some(value) = map.get(key) {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }
    if let Some(timeout) = map.get("request_timeout_secs") {
        output.push_str(&format!("  Timeout: {}s\n", timeout));
    }

    output.push_str("\nRetry:\n");
    if let Some(attempts) = map.get("max_attempts") {
        output.push_str(&format!("  Max Attempts: {}\n", attempts));
    }
    if let Some(base) = map.get("retry_base_delay_secs") {
        output.push_str(&format!("  Base Delay: {}s\n", base));
    }
    if let Some(max) = map.get("max_backoff_secs") {
        output.push_str(&format!("  Max Total Backoff: {}s\n", max));
    }

    output.push_str("\nOther:\n");
    if let Some(level) = map.get("log_level") {
        output.push_str(&format!("  Log Level: {}\n", level));
    }
    if let Some(token) = map.get("github_token") {
        output.push_str(&format!("  GitHub Token: {}\n", token));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{baseline_analysis, AnalysisReport, Provenance};
    use crate::jobs::JobType;
    use crate::llm::models::SUPPORTED_MODELS;
    use crate::pipeline::ShellDialect;
    use crate::repository::{FileEntry, RepositoryStructure};

    fn create_test_report() -> AnalysisReport {
        let structure = RepositoryStructure {
            files: vec![FileEntry::new("package.json", 120)],
            ..Default::default()
        };
        let mut analysis = baseline_analysis(&structure, ShellDialect::Posix);
        analysis.install_commands.clear();
        analysis.build_commands = vec!["npm run build".to_string()];
        analysis.test_commands = vec!["npm test".to_string()];
        AnalysisReport {
            analysis,
            jenkinsfile: "pipeline {\n    agent any\n}\n".to_string(),
            explanation: "Node project".to_string(),
            recommendations: vec!["Cache node_modules".to_string()],
            provenance: Provenance::Generator,
        }
    }

    #[test]
    fn test_json_format() {
        let report = create_test_report();
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report)
            .unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, report);
        assert!(output.contains("\"provenance\": \"generator\""));
    }

    #[test]
    fn test_yaml_format() {
        let report = create_test_report();
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&report)
            .unwrap();
        assert!(output.contains("npm run build"));
        let parsed: AnalysisReport = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed.analysis.test_commands, vec!["npm test"]);
    }

    #[test]
    fn test_human_format() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&create_test_report())
            .unwrap();
        assert!(output.contains("Pipeline Analysis"));
        assert!(output.contains("Build:"));
        assert!(output.contains("npm run build"));
        assert!(output.contains("Install: (none)"));
        assert!(output.contains("Recommendations:"));
        assert!(output.contains("Cache node_modules"));
        assert!(output.contains("agent any"));
    }

    #[test]
    fn test_jenkinsfile_format_is_script_only() {
        let output = OutputFormatter::new(OutputFormat::Jenkinsfile)
            .format_report(&create_test_report())
            .unwrap();
        assert_eq!(output, "pipeline {\n    agent any\n}\n");
    }

    #[test]
    fn test_job_spec_formats() {
        let spec = JobSpec::new(JobType::Matrix).with_field("axis_name", "jdk");
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_job_spec(&spec)
            .unwrap();
        assert!(json.contains("\"matrix\""));
        assert!(json.contains("\"axis_name\": \"jdk\""));
        assert!(OutputFormatter::new(OutputFormat::Human)
            .format_job_spec(&spec)
            .is_err());
    }

    #[test]
    fn test_models_human_marks_default() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_models(SUPPORTED_MODELS, "gemini-2.5-flash")
            .unwrap();
        assert!(output.contains("gemini-2.5-pro"));
        assert!(output.contains("[default, fallback]"));
    }
}
