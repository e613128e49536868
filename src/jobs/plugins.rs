//! Build-server plugins each job type depends on

use super::types::JobType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A plugin as reported by the build server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPlugin {
    pub short_name: String,
    pub enabled: bool,
}

impl InstalledPlugin {
    pub fn enabled(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            enabled: true,
        }
    }

    pub fn disabled(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            enabled: false,
        }
    }
}

/// Required plugins that are absent or switched off
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginCheck {
    pub missing: Vec<String>,
    pub disabled: Vec<String>,
}

impl PluginCheck {
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty() && self.disabled.is_empty()
    }
}

impl fmt::Display for PluginCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("Missing: {}", self.missing.join(", ")));
        }
        if !self.disabled.is_empty() {
            parts.push(format!("Disabled: {}", self.disabled.join(", ")));
        }
        if parts.is_empty() {
            f.write_str("All required plugins available")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

const PIPELINE: &[&str] = &[
    "workflow-aggregator",
    "workflow-api",
    "workflow-job",
    "workflow-support",
    "workflow-step-api",
    "workflow-durable-task-step",
    "workflow-scm-step",
    "workflow-cps",
    "workflow-basic-steps",
    "pipeline-stage-view",
    "structs",
    "script-security",
    "scm-api",
    "credentials",
    "durable-task",
];

const MULTIBRANCH: &[&str] = &[
    "workflow-aggregator",
    "workflow-api",
    "workflow-job",
    "workflow-support",
    "workflow-multibranch",
    "branch-api",
    "scm-api",
    "structs",
    "credentials",
    "git",
];

const ORGANIZATION: &[&str] = &[
    "github-branch-source",
    "branch-api",
    "scm-api",
    "workflow-multibranch",
    "structs",
    "credentials",
];

/// Immutable job-type to plugin table, built once and shared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequirements {
    table: BTreeMap<JobType, Vec<String>>,
}

impl Default for PluginRequirements {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        Self::from_table(BTreeMap::from([
            (JobType::Pipeline, owned(PIPELINE)),
            (JobType::Multibranch, owned(MULTIBRANCH)),
            (JobType::Freestyle, owned(&["git", "credentials"])),
            (JobType::External, Vec::new()),
            (JobType::Matrix, owned(&["git", "credentials"])),
            (JobType::Folder, owned(&["cloudbees-folder"])),
            (JobType::Organization, owned(ORGANIZATION)),
        ]))
    }
}

impl PluginRequirements {
    pub fn from_table(table: BTreeMap<JobType, Vec<String>>) -> Self {
        Self { table }
    }

    pub fn required(&self, job_type: JobType) -> &[String] {
        self.table.get(&job_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Compares the requirements of `job_type` against an installed listing
    pub fn check(&self, job_type: JobType, installed: &[InstalledPlugin]) -> PluginCheck {
        let mut check = PluginCheck::default();
        for name in self.required(job_type) {
            match installed.iter().find(|p| &p.short_name == name) {
                None => check.missing.push(name.clone()),
                Some(plugin) if !plugin.enabled => check.disabled.push(name.clone()),
                Some(_) => {}
            }
        }
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        let req = PluginRequirements::default();
        assert_eq!(req.required(JobType::Pipeline).len(), 15);
        assert_eq!(req.required(JobType::Multibranch).len(), 10);
        assert_eq!(req.required(JobType::Organization).len(), 6);
        assert!(req.required(JobType::External).is_empty());
        assert_eq!(req.required(JobType::Folder), ["cloudbees-folder"]);
    }

    #[test]
    fn test_missing_and_disabled() {
        let req = PluginRequirements::default();
        let installed = vec![InstalledPlugin::disabled("credentials")];
        let check = req.check(JobType::Freestyle, &installed);

        assert!(!check.is_satisfied());
        assert_eq!(check.missing, vec!["git"]);
        assert_eq!(check.disabled, vec!["credentials"]);
        assert_eq!(check.to_string(), "Missing: git; Disabled: credentials");
    }

    #[test]
    fn test_no_requirements_always_satisfied() {
        let check = PluginRequirements::default().check(JobType::External, &[]);
        assert!(check.is_satisfied());
    }
}
