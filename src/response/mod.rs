//! Turning raw generator text into a validated [`AnalysisReport`]
//!
//! [`process`] never fails. Parsing falls back through repair, script
//! salvage and heuristics; placeholder validation then runs on anything the
//! generator actually produced.

pub mod parser;
pub mod placeholder;
pub mod tolerant_json;

pub use parser::{extract_pipeline_script, merge_analysis, parse_response, MIN_SCRIPT_CHARS};
pub use placeholder::{enhance, find_placeholders, validate_report, PlaceholderFinding, PLACEHOLDER_PHRASES};
pub use tolerant_json::{extract_object, ParseError, Repair};

use crate::analysis::{AnalysisContext, AnalysisReport};

/// Parses generator text and enhances placeholder output
pub fn process(text: &str, ctx: &AnalysisContext<'_>) -> AnalysisReport {
    validate_report(parse_response(text, ctx), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Provenance;
    use crate::pipeline::ShellDialect;
    use crate::repository::RepositoryStructure;

    #[test]
    fn test_placeholder_generator_output_is_enhanced() {
        let structure = RepositoryStructure {
            readme: "## Usage\n```\npip install flask\npython app.py\n```".into(),
            ..Default::default()
        };
        let ctx = AnalysisContext::new(&structure, ShellDialect::Posix);
        let text = r#"{"analysis": {"project_type": "Python Application", "build_commands": ["echo \"Build completed\""]}, "jenkinsfile": "pipeline {\n agent any\n stages { stage('Build') { steps { sh 'echo \"Build completed\"' } } }\n}"}"#;
        let report = process(text, &ctx);

        assert_eq!(report.provenance, Provenance::Enhanced);
        assert_eq!(report.analysis.project_type.as_str(), "Python Application");
        assert_eq!(report.analysis.install_commands, vec!["pip install flask"]);
        assert_eq!(report.analysis.run_commands, vec!["python app.py"]);
        assert!(report.analysis.build_commands.is_empty());
        assert!(!report.jenkinsfile.contains("Build completed"));
    }

    #[test]
    fn test_heuristic_report_is_not_revalidated() {
        // requirements.txt is absent, so a revalidation pass would flag this
        let structure = RepositoryStructure {
            readme: "```\npip install -r requirements.txt\n```".into(),
            ..Default::default()
        };
        let ctx = AnalysisContext::new(&structure, ShellDialect::Windows);
        let report = process("I cannot help with that.", &ctx);
        assert_eq!(report.provenance, Provenance::Heuristic);
        assert!(report
            .jenkinsfile
            .contains("bat \"pip install -r requirements.txt\""));
        assert!(report.jenkinsfile.contains("executed using bat commands."));
    }
}
