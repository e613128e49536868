//! Declarative pipeline script generation

pub mod dialect;
pub mod jenkinsfile;

pub use dialect::{groovy_double, groovy_single, ShellDialect, UnknownDialect};
pub use jenkinsfile::{
    generate_pipeline_script, stage_names, DEFAULT_BRANCH, PLACEHOLDER_REPOSITORY_URL, STAGE_NAMES,
};
