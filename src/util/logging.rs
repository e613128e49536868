//! Structured logging setup
//!
//! Wraps `tracing-subscriber` with an [`EnvFilter`]. `RUST_LOG` always wins
//! for fine-grained filtering; otherwise the configured level applies to the
//! `pipeforge` target and noisy HTTP crates are capped at `warn`.
//!
//! Logs go to stderr so report output on stdout stays machine-readable.
//!
//! ```no_run
//! use pipeforge::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!(repo = "octo/demo", "Analyzing repository");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "PIPEFORGE_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "PIPEFORGE_LOG_JSON";

static INIT: Once = Once::new();

const QUIET_CRATES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "genai"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for the `pipeforge` target
    pub level: Level,
    pub use_json: bool,
    pub include_target: bool,
    /// File and line of each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON lines with source locations
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    /// Adjusts a base level by CLI verbosity flags
    ///
    /// Each `-v` lowers the threshold one step; `-q` limits output to errors.
    pub fn from_verbosity(base: Level, verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else {
            match (base, verbose) {
                (level, 0) => level,
                (Level::ERROR, 1) => Level::WARN,
                (Level::ERROR, 2) | (Level::WARN, 1) => Level::INFO,
                (Level::INFO, 1) | (Level::WARN, 2) | (Level::ERROR, 3) => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        Self::with_level(level)
    }
}

/// Parses a level name, case-insensitively
pub fn try_parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Like [`try_parse_level`] but falls back to `INFO`
pub fn parse_level(level: &str) -> Level {
    try_parse_level(level).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level
        );
        Level::INFO
    })
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("pipeforge={}", config.level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for krate in QUIET_CRATES {
            if let Ok(directive) = format!("{}=warn", krate).parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Installs the global subscriber; later calls are no-ops
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `PIPEFORGE_LOG_LEVEL` and `PIPEFORGE_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);
    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
