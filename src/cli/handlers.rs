//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 on failure.
//! Failures are printed to stderr; results go to stdout or `--output`.

use super::commands::{AnalyzeArgs, CompileJobArgs, ConfigArgs, ModelsArgs, ParseJobArgs};
use super::output::OutputFormatter;
use crate::analysis::{AnalysisRequest, AnalysisService};
use crate::config::{ConfigError, PipeforgeConfig};
use crate::jobs::{compile_tagged, parse_descriptor};
use crate::llm::models::{select_model, SUPPORTED_MODELS};
use crate::llm::LLMClient;
use crate::repository::{parse_github_url, GitHubSource, LocalSource, RepositorySource};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub async fn handle_analyze(args: &AnalyzeArgs, config: &PipeforgeConfig) -> i32 {
    let (source, request) = match resolve_repository(args, config) {
        Ok(resolved) => resolved,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    let mut service = AnalysisService::new(source)
        .with_policy(config.retry_policy())
        .with_default_model(config.model.clone());

    if args.offline {
        info!("Offline mode, generator disabled");
    } else {
        match config.create_client() {
            Ok(client) => {
                let client: Arc<dyn LLMClient> = Arc::new(client);
                service = service.with_client(client);
            }
            Err(ConfigError::MissingCredentials { provider, env_var }) => {
                warn!(
                    provider = %provider,
                    env_var = %env_var,
                    "No generator credentials, falling back to repository signals"
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    }

    let report = match service.analyze(&request).await {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = match formatter.format_report(&report) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    exit_code(write_output(&rendered, args.output.as_deref()))
}

/// Local directories are scanned in place; anything else must be a GitHub URL
fn resolve_repository(
    args: &AnalyzeArgs,
    config: &PipeforgeConfig,
) -> Result<(Arc<dyn RepositorySource>, AnalysisRequest)> {
    let branch = args.branch.clone().unwrap_or_default();
    let path = Path::new(&args.repository);

    let (source, request): (Arc<dyn RepositorySource>, AnalysisRequest) = if path.is_dir() {
        let local = LocalSource::new(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        debug!(root = %local.root().display(), "Using local repository");
        (Arc::new(local), AnalysisRequest::new("", ""))
    } else {
        let repo_ref = parse_github_url(&args.repository)?;
        let github = GitHubSource::new(config.github_token.clone(), config.request_timeout())
            .context("Failed to create GitHub client")?;
        debug!(owner = %repo_ref.owner, repo = %repo_ref.repo, "Using GitHub repository");
        (
            Arc::new(github),
            AnalysisRequest::new(repo_ref.owner, repo_ref.repo),
        )
    };

    let mut request = request
        .with_branch(branch)
        .with_shell(args.shell.clone());
    if let Some(model) = &args.model {
        request = request.with_model(model.clone());
    }
    Ok((source, request))
}

pub fn handle_compile_job(args: &CompileJobArgs) -> i32 {
    exit_code(compile_job(args))
}

fn compile_job(args: &CompileJobArgs) -> Result<()> {
    let fields = collect_fields(args.fields_file.as_deref(), &args.fields)?;
    debug!(count = fields.len(), "Collected job fields");
    let descriptor = compile_tagged(args.job_type.as_deref(), fields)?;
    write_output(&descriptor, args.output.as_deref())
}

/// Merges the fields file with `--field` pairs; later values win
pub fn collect_fields(
    fields_file: Option<&Path>,
    pairs: &[(String, String)],
) -> Result<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    if let Some(file) = fields_file {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read fields file {}", file.display()))?;
        let parsed: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("{} must be a JSON object of strings", file.display()))?;
        fields.extend(parsed);
    }
    for (key, value) in pairs {
        fields.insert(key.clone(), field_value(value)?);
    }
    Ok(fields)
}

fn field_value(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(file) if !file.is_empty() => fs::read_to_string(file)
            .with_context(|| format!("Failed to read field value from {}", file)),
        _ => Ok(value.to_string()),
    }
}

pub fn handle_parse_job(args: &ParseJobArgs) -> i32 {
    let result = fs::read_to_string(&args.descriptor)
        .with_context(|| format!("Failed to read {}", args.descriptor.display()))
        .and_then(|xml| parse_descriptor(&xml).map_err(anyhow::Error::from))
        .and_then(|spec| OutputFormatter::new(args.format.into()).format_job_spec(&spec))
        .and_then(|rendered| write_output(&rendered, None));
    exit_code(result)
}

pub fn handle_models(args: &ModelsArgs, config: &PipeforgeConfig) -> i32 {
    let default_model = select_model(config.model.as_deref());
    let result = OutputFormatter::new(args.format.into())
        .format_models(SUPPORTED_MODELS, default_model)
        .and_then(|rendered| write_output(&rendered, None));
    exit_code(result)
}

pub fn handle_config(args: &ConfigArgs, config: &PipeforgeConfig) -> i32 {
    let result = OutputFormatter::new(args.format.into())
        .format_config(config)
        .and_then(|rendered| write_output(&rendered, None));
    exit_code(result)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_collect_fields_merges_file_and_pairs() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"repository_url": "https://example.com/a.git", "description": "from file"}}"#
        )
        .unwrap();

        let fields = collect_fields(
            Some(file.path()),
            &[("description".to_string(), "from flag".to_string())],
        )
        .unwrap();
        assert_eq!(fields["repository_url"], "https://example.com/a.git");
        assert_eq!(fields["description"], "from flag");
    }

    #[test]
    fn test_field_value_reads_file() {
        let mut script = NamedTempFile::new().unwrap();
        write!(script, "pipeline {{ agent any }}").unwrap();
        let reference = format!("@{}", script.path().display());
        assert_eq!(field_value(&reference).unwrap(), "pipeline { agent any }");
        assert_eq!(field_value("@").unwrap(), "@");
        assert_eq!(field_value("plain").unwrap(), "plain");
    }

    #[test]
    fn test_fields_file_must_be_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(collect_fields(Some(file.path()), &[]).is_err());
    }

    #[test]
    fn test_compile_job_writes_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("job.xml");
        let args = CompileJobArgs {
            job_type: Some("folder".to_string()),
            fields: vec![("description".to_string(), "Team jobs".to_string())],
            fields_file: None,
            output: Some(output.clone()),
        };
        assert_eq!(handle_compile_job(&args), 0);
        let xml = fs::read_to_string(output).unwrap();
        assert!(xml.contains("<description>Team jobs</description>"));
    }

    #[test]
    fn test_compile_job_missing_field_fails() {
        let args = CompileJobArgs {
            job_type: Some("organization".to_string()),
            fields: vec![],
            fields_file: None,
            output: None,
        };
        assert_eq!(handle_compile_job(&args), 1);
    }
}
