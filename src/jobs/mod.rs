//! Build-server job descriptors
//!
//! A [`JobSpec`] is a job type plus a flat field map. [`compile`] renders it
//! to the descriptor document the build server accepts, [`parse_descriptor`]
//! reads one back, and [`JobPublisher`] submits compiled jobs after checking
//! the server's installed plugins.

pub mod compiler;
pub mod parse;
pub mod plugins;
pub mod server;
pub mod templates;
pub mod types;
pub mod xml;

pub use compiler::{compile, compile_tagged, CompileError};
pub use parse::{parse_descriptor, DescriptorError};
pub use plugins::{InstalledPlugin, PluginCheck, PluginRequirements};
pub use server::{
    is_valid_job_name, pipeline_job_from_report, BuildServer, JobPublisher, PublishError,
    PublishMode, PublishOutcome, ServerError,
};
pub use templates::StepType;
pub use types::{fields, GitBlock, JobSpec, JobType};
