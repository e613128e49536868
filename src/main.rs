use pipeforge::cli::commands::{CliArgs, Commands};
use pipeforge::cli::handlers::{
    handle_analyze, handle_compile_job, handle_config, handle_models, handle_parse_job,
};
use pipeforge::config::PipeforgeConfig;
use pipeforge::util::logging::{self, LoggingConfig};
use pipeforge::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = PipeforgeConfig::default();
    init_logging_from_args(&args, &config);

    debug!("pipeforge v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    debug!("{}", config);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, &config).await,
        Commands::CompileJob(compile_args) => handle_compile_job(compile_args),
        Commands::ParseJob(parse_args) => handle_parse_job(parse_args),
        Commands::Models(models_args) => handle_models(models_args, &config),
        Commands::Config(config_args) => handle_config(config_args, &config),
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `-v`/`-q`, which adjust the configured level
fn init_logging_from_args(args: &CliArgs, config: &PipeforgeConfig) {
    let base = logging::config_from_env();
    let logging_config = match &args.log_level {
        Some(level) => LoggingConfig {
            level: logging::parse_level(level),
            ..base
        },
        None => LoggingConfig {
            use_json: base.use_json,
            ..LoggingConfig::from_verbosity(
                logging::parse_level(&config.log_level),
                args.verbose,
                args.quiet,
            )
        },
    };
    logging::init_logging(logging_config);
}
