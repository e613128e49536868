pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CliArgs, Commands, CompileJobArgs, ModelsArgs};
pub use output::{OutputFormat, OutputFormatter};
