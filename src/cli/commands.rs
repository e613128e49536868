use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CI pipeline synthesis from repository signals
#[derive(Parser, Debug)]
#[command(
    name = "pipeforge",
    about = "Generate CI pipelines and build-server job descriptors from repository signals",
    version,
    author,
    long_about = "pipeforge inspects a repository (GitHub URL or local checkout), asks a text \
                  generator for a structured build analysis and a declarative pipeline script, \
                  and falls back to manifest heuristics when the generator is unavailable. \
                  It also compiles job specifications into build-server descriptors."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a repository and generate a pipeline",
        long_about = "Fetches a repository snapshot, classifies it and produces a build analysis \
                      plus a pipeline script.\n\n\
                      Examples:\n  \
                      pipeforge analyze https://github.com/octo/demo\n  \
                      pipeforge analyze . --offline --format jenkinsfile\n  \
                      pipeforge analyze https://github.com/octo/demo --shell windows --format json"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        name = "compile-job",
        about = "Compile a job specification into a descriptor",
        long_about = "Renders a job type plus field map into the descriptor document the build \
                      server accepts. Unknown job types compile as freestyle.\n\n\
                      Examples:\n  \
                      pipeforge compile-job --type pipeline --field pipeline_script=@Jenkinsfile\n  \
                      pipeforge compile-job --type multibranch --field repository_url=https://github.com/octo/demo.git\n  \
                      pipeforge compile-job --type freestyle --fields-file job.json"
    )]
    CompileJob(CompileJobArgs),

    #[command(
        name = "parse-job",
        about = "Read a descriptor back into a job specification"
    )]
    ParseJob(ParseJobArgs),

    #[command(about = "List supported generator models")]
    Models(ModelsArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "REPOSITORY",
        help = "GitHub repository URL or path to a local checkout"
    )]
    pub repository: String,

    #[arg(short = 'b', long, value_name = "BRANCH", help = "Branch to analyze")]
    pub branch: Option<String>,

    #[arg(
        short = 's',
        long,
        value_name = "SHELL",
        default_value = "posix",
        help = "Target shell environment: posix, windows or apple-script"
    )]
    pub shell: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Generator model (unsupported names fall back to the default)"
    )]
    pub model: Option<String>,

    #[arg(long, help = "Skip the generator and use repository signals only")]
    pub offline: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompileJobArgs {
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        help = "Job type: pipeline, multibranch, freestyle, external, matrix, folder, organization"
    )]
    pub job_type: Option<String>,

    #[arg(
        long = "field",
        value_name = "KEY=VALUE",
        value_parser = parse_field,
        help = "Job field; a value starting with @ is read from that file"
    )]
    pub fields: Vec<(String, String)>,

    #[arg(
        long,
        value_name = "FILE",
        help = "JSON object of fields, applied before --field values"
    )]
    pub fields_file: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the descriptor to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ParseJobArgs {
    #[arg(value_name = "FILE", help = "Descriptor document to read")]
    pub descriptor: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: DataFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ModelsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
    Jenkinsfile,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormatArg {
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
            OutputFormatArg::Jenkinsfile => super::output::OutputFormat::Jenkinsfile,
        }
    }
}

impl From<DataFormatArg> for super::output::OutputFormat {
    fn from(arg: DataFormatArg) -> Self {
        match arg {
            DataFormatArg::Json => super::output::OutputFormat::Json,
            DataFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid field '{}': expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid field '{}': key is empty", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_analyze_args() {
        let args = CliArgs::parse_from(["pipeforge", "analyze", "https://github.com/octo/demo"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.repository, "https://github.com/octo/demo");
                assert_eq!(analyze.format, OutputFormatArg::Human);
                assert_eq!(analyze.shell, "posix");
                assert!(analyze.branch.is_none());
                assert!(analyze.model.is_none());
                assert!(!analyze.offline);
            }
            _ => panic!("Expected Analyze command"),
        }
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_analyze_with_options() {
        let args = CliArgs::parse_from([
            "pipeforge",
            "-vv",
            "analyze",
            ".",
            "--shell",
            "windows",
            "--format",
            "jenkinsfile",
            "--offline",
            "--branch",
            "develop",
        ]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.shell, "windows");
                assert_eq!(analyze.format, OutputFormatArg::Jenkinsfile);
                assert_eq!(analyze.branch.as_deref(), Some("develop"));
                assert!(analyze.offline);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_compile_job_fields() {
        let args = CliArgs::parse_from([
            "pipeforge",
            "compile-job",
            "--type",
            "multibranch",
            "--field",
            "repository_url=https://example.com/r.git?a=b",
            "--field",
            "description=",
        ]);
        match args.command {
            Commands::CompileJob(compile) => {
                assert_eq!(compile.job_type.as_deref(), Some("multibranch"));
                assert_eq!(
                    compile.fields,
                    vec![
                        (
                            "repository_url".to_string(),
                            "https://example.com/r.git?a=b".to_string()
                        ),
                        ("description".to_string(), String::new()),
                    ]
                );
            }
            _ => panic!("Expected CompileJob command"),
        }
    }

    #[test]
    fn test_invalid_field_rejected() {
        assert!(CliArgs::try_parse_from(["pipeforge", "compile-job", "--field", "novalue"]).is_err());
        assert!(CliArgs::try_parse_from(["pipeforge", "compile-job", "--field", "=x"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["pipeforge", "-v", "-q", "models"]);
        assert!(result.is_err());
    }
}
