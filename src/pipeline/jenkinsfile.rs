//! Declarative pipeline script assembly
//!
//! Output is a pure function of its inputs: same analysis, dialect, URL and
//! branch always yield byte-identical text.

use super::dialect::{groovy_single, ShellDialect};
use crate::analysis::BuildAnalysis;
use crate::stack::BuildSystemId;

pub const PLACEHOLDER_REPOSITORY_URL: &str = "https://github.com/yourusername/your-repo.git";
pub const DEFAULT_BRANCH: &str = "main";

/// Stage names in emission order
pub const STAGE_NAMES: &[&str] = &[
    "Checkout",
    "Install Dependencies",
    "Build",
    "Test",
    "Validate",
    "Archive Artifacts",
];

const ARCHIVE_DIRECTORIES: &[&str] = &["dist", "build", "target"];
const SOURCE_ARTIFACT_GLOB: &str = "*.py,*.js,*.java,*.go,*.rs,*.php";

struct ScriptWriter {
    out: String,
    depth: usize,
}

impl ScriptWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// `} catch (...) {` at the enclosing level
    fn reopen(&mut self, header: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}} {} {{", header));
        self.depth += 1;
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Tool installations the build system needs on the agent
fn tools_for(analysis: &BuildAnalysis) -> Vec<(&'static str, &'static str)> {
    let runs_node = analysis
        .run_commands
        .iter()
        .any(|cmd| cmd.starts_with("node ") || cmd.starts_with("npm ") || cmd.starts_with("yarn "));

    match &analysis.build_system {
        bs if bs.is_node() => vec![("nodejs", "NodeJS")],
        BuildSystemId::Maven => vec![("maven", "Maven"), ("jdk", "JDK-11")],
        BuildSystemId::Gradle => vec![("jdk", "JDK-11")],
        _ if runs_node => vec![("nodejs", "NodeJS")],
        _ => Vec::new(),
    }
}

fn validate_probe(command: &str) -> String {
    let program = command.split_whitespace().next().unwrap_or(command);
    format!(
        "{} --help || echo \"Testing {} availability\"",
        command, program
    )
}

fn plain_stage(w: &mut ScriptWriter, name: &str, commands: &[String], dialect: ShellDialect) {
    w.open(&format!("stage('{}')", name));
    w.open("steps");
    for cmd in commands {
        w.line(&dialect.wrap(cmd));
    }
    w.close();
    w.close();
}

fn guarded_stage(
    w: &mut ScriptWriter,
    name: &str,
    banner: Option<&str>,
    steps: &[String],
    failure: &str,
) {
    w.open(&format!("stage('{}')", name));
    w.open("steps");
    w.open("script");
    if let Some(banner) = banner {
        w.line(&format!("echo '{}'", banner));
    }
    w.open("try");
    for step in steps {
        w.line(step);
    }
    w.reopen("catch (Exception e)");
    w.line(&format!("echo '{}'", failure));
    w.close();
    w.close();
    w.close();
    w.close();
}

fn archive_stage(w: &mut ScriptWriter) {
    w.open("stage('Archive Artifacts')");
    w.open("steps");
    w.open("script");
    w.open("try");
    let any_dir = ARCHIVE_DIRECTORIES
        .iter()
        .map(|dir| format!("fileExists('{}')", dir))
        .collect::<Vec<_>>()
        .join(" || ");
    w.open(&format!("if ({})", any_dir));
    for dir in ARCHIVE_DIRECTORIES {
        w.open(&format!("if (fileExists('{}'))", dir));
        w.line(&format!(
            "archiveArtifacts artifacts: '{}/**/*', fingerprint: true, allowEmptyArchive: true",
            dir
        ));
        w.close();
    }
    w.reopen("else");
    w.line(&format!(
        "archiveArtifacts artifacts: '{}', fingerprint: true, allowEmptyArchive: true",
        SOURCE_ARTIFACT_GLOB
    ));
    w.close();
    w.reopen("catch (Exception e)");
    w.line("echo \"Archiving failed: ${e.message}\"");
    w.close();
    w.close();
    w.close();
    w.close();
}

fn post_block(w: &mut ScriptWriter, analysis: &BuildAnalysis, dialect: ShellDialect) {
    let origin = if analysis.readme_based {
        "README-based build"
    } else {
        "Build"
    };
    let check = if analysis.readme_based {
        "README commands"
    } else {
        "build configuration"
    };

    w.open("post");
    w.open("success");
    w.line(&format!(
        "echo 'Pipeline completed successfully! {} executed using {} commands.'",
        origin,
        dialect.executor()
    ));
    w.close();
    w.open("failure");
    w.line(&format!(
        "echo 'Pipeline failed. Check {} and dependencies.'",
        check
    ));
    w.close();
    w.open("always");
    w.line("echo 'Cleaning up workspace...'");
    w.line("cleanWs()");
    w.close();
    w.close();
}

/// Renders the multi-stage pipeline script for an analysis
///
/// Conditional stages are emitted only when their command list is non-empty;
/// Checkout and Archive Artifacts are always present.
pub fn generate_pipeline_script(
    analysis: &BuildAnalysis,
    dialect: ShellDialect,
    repository_url: Option<&str>,
    branch: Option<&str>,
) -> String {
    let repository_url = repository_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(PLACEHOLDER_REPOSITORY_URL);
    let branch = branch
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(DEFAULT_BRANCH);

    let mut w = ScriptWriter::new();
    w.open("pipeline");
    w.line("agent any");

    let tools = tools_for(analysis);
    if !tools.is_empty() {
        w.open("tools");
        for (kind, name) in tools {
            w.line(&format!("{} '{}'", kind, name));
        }
        w.close();
    }

    w.open("environment");
    w.line(&format!("GIT_URL = '{}'", groovy_single(repository_url)));
    w.line(&format!("BRANCH = '{}'", groovy_single(branch)));
    w.close();

    w.open("stages");

    w.open("stage('Checkout')");
    w.open("steps");
    w.line("checkout scm");
    w.line("echo 'Repository checked out successfully'");
    w.line("echo \"Cloning from: ${env.GIT_URL}\"");
    w.line("echo \"Branch: ${env.BRANCH}\"");
    w.close();
    w.close();

    if !analysis.install_commands.is_empty() {
        plain_stage(&mut w, "Install Dependencies", &analysis.install_commands, dialect);
    }
    if !analysis.build_commands.is_empty() {
        plain_stage(&mut w, "Build", &analysis.build_commands, dialect);
    }
    if !analysis.test_commands.is_empty() {
        let steps: Vec<String> = analysis
            .test_commands
            .iter()
            .map(|cmd| dialect.wrap(cmd))
            .collect();
        guarded_stage(
            &mut w,
            "Test",
            None,
            &steps,
            "Tests failed or not properly configured",
        );
    }
    if !analysis.run_commands.is_empty() {
        let steps: Vec<String> = analysis
            .run_commands
            .iter()
            .map(|cmd| dialect.wrap(&validate_probe(cmd)))
            .collect();
        guarded_stage(
            &mut w,
            "Validate",
            Some("Validating application can run..."),
            &steps,
            "Validation failed or not properly configured",
        );
    }

    archive_stage(&mut w);
    w.close();

    post_block(&mut w, analysis, dialect);
    w.close();
    w.finish()
}

/// Stage names present in a rendered script, in order
pub fn stage_names(script: &str) -> Vec<String> {
    script
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("stage('")?;
            let end = rest.find("')")?;
            Some(rest[..end].to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::heuristics::baseline_analysis;
    use crate::repository::RepositoryStructure;

    fn analysis() -> BuildAnalysis {
        let mut analysis = baseline_analysis(&RepositoryStructure::default(), ShellDialect::Posix);
        analysis.install_commands = vec!["pip install -r requirements.txt".into()];
        analysis.build_commands = Vec::new();
        analysis.test_commands = vec!["python -m pytest".into()];
        analysis.run_commands = vec!["python app.py".into()];
        analysis
    }

    #[test]
    fn test_stage_selection() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::Posix, None, None);
        assert_eq!(
            stage_names(&script),
            vec![
                "Checkout",
                "Install Dependencies",
                "Test",
                "Validate",
                "Archive Artifacts"
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let a = generate_pipeline_script(&analysis(), ShellDialect::Windows, Some("u"), Some("b"));
        let b = generate_pipeline_script(&analysis(), ShellDialect::Windows, Some("u"), Some("b"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_environment_defaults() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::Posix, None, Some(""));
        assert!(script.contains(&format!("GIT_URL = '{}'", PLACEHOLDER_REPOSITORY_URL)));
        assert!(script.contains("BRANCH = 'main'"));
    }

    #[test]
    fn test_validate_probe_and_wrapping() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::Posix, None, None);
        assert!(script.contains(
            "sh 'python app.py --help || echo \"Testing python availability\"'"
        ));
        assert!(script.contains("echo 'Tests failed or not properly configured'"));
    }

    #[test]
    fn test_windows_wrapping() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::Windows, None, None);
        assert!(script.contains("bat \"pip install -r requirements.txt\""));
        assert!(script.contains("executed using bat commands."));
    }

    #[test]
    fn test_multiline_command_stays_on_one_line() {
        let mut analysis = analysis();
        analysis.build_commands = vec!["make\nmake install".into()];
        let script = generate_pipeline_script(&analysis, ShellDialect::Posix, None, None);
        assert!(script.contains(r"sh 'make\nmake install'"));
        assert!(script
            .lines()
            .filter(|line| line.contains("sh '"))
            .all(|line| line.trim_end().ends_with('\'')));
    }

    #[test]
    fn test_tools_block_for_maven() {
        let mut analysis = analysis();
        analysis.build_system = BuildSystemId::Maven;
        let script = generate_pipeline_script(&analysis, ShellDialect::Posix, None, None);
        assert!(script.contains("maven 'Maven'"));
        assert!(script.contains("jdk 'JDK-11'"));
    }

    #[test]
    fn test_no_tools_block_for_pip() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::Posix, None, None);
        assert!(!script.contains("tools {"));
    }

    #[test]
    fn test_balanced_braces_and_post() {
        let script = generate_pipeline_script(&analysis(), ShellDialect::AppleScript, None, None);
        let opens = script.matches('{').count();
        let closes = script.matches('}').count();
        assert_eq!(opens, closes);
        assert!(script.starts_with("pipeline {"));
        assert!(script.contains("cleanWs()"));
        assert!(script.contains("sh \"osascript -e 'pip install -r requirements.txt'\""));
    }
}
