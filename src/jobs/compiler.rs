//! `JobSpec` to descriptor compilation
//!
//! Dispatch is a strategy table keyed by [`JobType`]. Unknown tags resolve
//! to freestyle before they reach the table, so compilation only fails when
//! a variant's required field is missing.

use super::templates::{self, ScmDefinition, DEFAULT_PIPELINE_BRANCH, DEFAULT_SCRIPT_PATH};
use super::types::{fields, JobSpec, JobType};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{job_type} job requires field '{field}'")]
    MissingField {
        job_type: JobType,
        field: &'static str,
    },
}

type Strategy = fn(&JobSpec) -> Result<String, CompileError>;

const STRATEGIES: &[(JobType, Strategy)] = &[
    (JobType::Pipeline, compile_pipeline),
    (JobType::Multibranch, compile_multibranch),
    (JobType::Freestyle, compile_freestyle),
    (JobType::External, compile_external),
    (JobType::Matrix, compile_matrix),
    (JobType::Folder, compile_folder),
    (JobType::Organization, compile_organization),
];

fn require<'a>(spec: &'a JobSpec, field: &'static str) -> Result<&'a str, CompileError> {
    spec.field(field).ok_or(CompileError::MissingField {
        job_type: spec.job_type,
        field,
    })
}

/// A git block must name its repository
fn check_git(spec: &JobSpec) -> Result<(), CompileError> {
    if spec.git().is_some() {
        require(spec, fields::REPOSITORY_URL)?;
    }
    Ok(())
}

fn compile_freestyle(spec: &JobSpec) -> Result<String, CompileError> {
    check_git(spec)?;
    Ok(templates::freestyle(spec))
}

fn compile_matrix(spec: &JobSpec) -> Result<String, CompileError> {
    check_git(spec)?;
    Ok(templates::matrix(spec))
}

fn compile_pipeline(spec: &JobSpec) -> Result<String, CompileError> {
    let from_scm = spec
        .field(fields::PIPELINE_DEFINITION_TYPE)
        .is_some_and(|t| t.eq_ignore_ascii_case("scm"));
    if !from_scm {
        return Ok(templates::pipeline(spec, None));
    }

    let definition = ScmDefinition {
        repository_url: require(spec, fields::REPOSITORY_URL)?,
        credentials_id: spec.field(fields::CREDENTIALS_ID),
        branch: spec.field_or(fields::BRANCH, DEFAULT_PIPELINE_BRANCH),
        script_path: spec.field_or(fields::SCRIPT_PATH, DEFAULT_SCRIPT_PATH),
    };
    Ok(templates::pipeline(spec, Some(definition)))
}

fn compile_multibranch(spec: &JobSpec) -> Result<String, CompileError> {
    let url = require(spec, fields::REPOSITORY_URL)?;
    Ok(templates::multibranch(spec, url))
}

fn compile_organization(spec: &JobSpec) -> Result<String, CompileError> {
    let name = require(spec, fields::ORGANIZATION_NAME)?;
    Ok(templates::organization(spec, name))
}

fn compile_external(spec: &JobSpec) -> Result<String, CompileError> {
    Ok(templates::external(spec))
}

fn compile_folder(spec: &JobSpec) -> Result<String, CompileError> {
    Ok(templates::folder(spec))
}

/// Compiles a spec to its descriptor document
pub fn compile(spec: &JobSpec) -> Result<String, CompileError> {
    let strategy = STRATEGIES
        .iter()
        .find(|(job_type, _)| *job_type == spec.job_type)
        .map(|(_, strategy)| *strategy)
        .unwrap_or(compile_freestyle);
    let document = strategy(spec)?;
    debug!(
        job_type = %spec.job_type,
        bytes = document.len(),
        "Compiled job descriptor"
    );
    Ok(document)
}

/// Compiles from a raw tag; unknown or missing tags produce freestyle
pub fn compile_tagged(
    tag: Option<&str>,
    fields: BTreeMap<String, String>,
) -> Result<String, CompileError> {
    compile(&JobSpec::from_tag(tag, fields))
}
