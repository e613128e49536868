use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Build-server job variants
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Pipeline,
    Multibranch,
    Freestyle,
    External,
    Matrix,
    Folder,
    Organization,
}

impl Default for JobType {
    fn default() -> Self {
        JobType::Freestyle
    }
}

impl JobType {
    pub const ALL: [JobType; 7] = [
        JobType::Pipeline,
        JobType::Multibranch,
        JobType::Freestyle,
        JobType::External,
        JobType::Matrix,
        JobType::Folder,
        JobType::Organization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Pipeline => "pipeline",
            JobType::Multibranch => "multibranch",
            JobType::Freestyle => "freestyle",
            JobType::External => "external",
            JobType::Matrix => "matrix",
            JobType::Folder => "folder",
            JobType::Organization => "organization",
        }
    }

    /// Exact, case-sensitive tag lookup
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Tag lookup with the freestyle fallback for unknown or missing tags
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.and_then(Self::parse) {
            Some(job_type) => job_type,
            None => {
                debug!(tag = ?tag, "Unknown job type, compiling as freestyle");
                JobType::Freestyle
            }
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names understood by the templates
pub mod fields {
    pub const DESCRIPTION: &str = "description";
    pub const BUILD_STEPS: &str = "build_steps";
    pub const BUILD_STEP_TYPE: &str = "build_step_type";
    pub const SCM_TYPE: &str = "scm_type";
    pub const REPOSITORY_URL: &str = "repository_url";
    pub const CREDENTIALS_ID: &str = "credentials_id";
    pub const BRANCH_SPECIFIER: &str = "branch_specifier";
    pub const REPOSITORY_BROWSER: &str = "repository_browser";
    pub const PIPELINE_DEFINITION_TYPE: &str = "pipeline_definition_type";
    pub const PIPELINE_SCRIPT: &str = "pipeline_script";
    pub const BRANCH: &str = "branch";
    pub const SCRIPT_PATH: &str = "script_path";
    pub const AXIS_NAME: &str = "axis_name";
    pub const AXIS_VALUES: &str = "axis_values";
    pub const ORGANIZATION_NAME: &str = "organization_name";
}

/// A job type plus its free-form field mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub job_type: JobType,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl JobSpec {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            fields: BTreeMap::new(),
        }
    }

    pub fn from_tag(tag: Option<&str>, fields: BTreeMap<String, String>) -> Self {
        Self {
            job_type: JobType::from_tag(tag),
            fields,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Field value, treating blank values as absent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn field_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.field(name).unwrap_or(default)
    }

    /// Git block, when `scm_type` is `git`
    pub fn git(&self) -> Option<GitBlock> {
        if !self.field(fields::SCM_TYPE).is_some_and(|s| s.eq_ignore_ascii_case("git")) {
            return None;
        }
        Some(GitBlock {
            url: self.field_or(fields::REPOSITORY_URL, "").to_string(),
            credentials_id: self.field(fields::CREDENTIALS_ID).map(str::to_string),
            branch_spec: self
                .field_or(fields::BRANCH_SPECIFIER, super::templates::DEFAULT_BRANCH_SPEC)
                .to_string(),
            browser: self
                .field(fields::REPOSITORY_BROWSER)
                .filter(|b| !b.eq_ignore_ascii_case("auto"))
                .map(str::to_string),
        })
    }
}

/// Version-control block for freestyle and matrix jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitBlock {
    pub url: String,
    pub credentials_id: Option<String>,
    pub branch_spec: String,
    /// Repository browser class name, `None` for automatic
    pub browser: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        pipeline = { Some("pipeline"), JobType::Pipeline },
        matrix = { Some("matrix"), JobType::Matrix },
        capitalized = { Some("Matrix"), JobType::Freestyle },
        padded = { Some(" folder "), JobType::Freestyle },
        unknown = { Some("nightly"), JobType::Freestyle },
        missing = { None, JobType::Freestyle },
    )]
    fn test_from_tag(tag: Option<&str>, expected: JobType) {
        assert_eq!(JobType::from_tag(tag), expected);
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let spec = JobSpec::new(JobType::Freestyle)
            .with_field("description", "  ")
            .with_field("build_steps", "make");
        assert_eq!(spec.field("description"), None);
        assert_eq!(spec.field_or("description", "none"), "none");
        assert_eq!(spec.field("build_steps"), Some("make"));
    }

    #[test]
    fn test_git_block() {
        let spec = JobSpec::new(JobType::Matrix)
            .with_field("scm_type", "git")
            .with_field("repository_url", "https://example.com/r.git")
            .with_field("repository_browser", "auto");
        let git = spec.git().unwrap();
        assert_eq!(git.branch_spec, "*/master");
        assert_eq!(git.credentials_id, None);
        assert_eq!(git.browser, None);

        assert!(JobSpec::new(JobType::Matrix).git().is_none());
    }
}
