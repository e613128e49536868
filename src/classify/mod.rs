//! Project-type classification
//!
//! Fuses the build profile, README text and repository listing into a single
//! human-readable label. Tiers are tried in priority order and the first tier
//! that produces a label wins:
//!
//! 1. framework inferred from manifest dependencies
//! 2. indicator phrase in the README
//! 3. indicator phrase in the selected manifest (application labels only)
//! 4. indicator among file and directory names
//! 5. dominant language
//! 6. `Generic Application`
//!
//! Classification never fails.

pub mod indicators;

use crate::repository::RepositoryStructure;
use crate::signals::{BuildProfile, ProfileSource};
use indicators::INDICATOR_TABLE;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const GENERIC_PROJECT_TYPE: &str = "Generic Application";

/// Non-empty project label such as "Django Application"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectType(String);

impl ProjectType {
    /// Wraps a label, falling back to the generic label when blank
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            Self::generic()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn generic() -> Self {
        Self(GENERIC_PROJECT_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        Self::generic()
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectType {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

fn listing_names(structure: &RepositoryStructure) -> Vec<String> {
    structure
        .files
        .iter()
        .map(|file| file.name.to_lowercase())
        .chain(
            structure
                .directories
                .iter()
                .map(|dir| format!("{}/", dir.to_lowercase())),
        )
        .chain(structure.key_files.keys().map(|key| key.to_lowercase()))
        .collect()
}

fn from_framework(profile: &BuildProfile) -> Option<String> {
    if !profile.source.is_manifest() {
        return None;
    }
    profile.framework.as_ref().map(|fw| fw.label())
}

fn from_readme(readme: &str) -> Option<&'static str> {
    let lower = readme.to_lowercase();
    if lower.trim().is_empty() {
        return None;
    }
    INDICATOR_TABLE
        .iter()
        .find(|rule| rule.matches_text(&lower))
        .map(|rule| rule.label)
}

fn from_manifest(structure: &RepositoryStructure, profile: &BuildProfile) -> Option<&'static str> {
    let ProfileSource::Manifest(file) = &profile.source else {
        return None;
    };
    let content = structure.key_file(file)?.to_lowercase();
    INDICATOR_TABLE
        .iter()
        .filter(|rule| rule.is_application())
        .find(|rule| rule.matches_text(&content))
        .map(|rule| rule.label)
}

fn from_listing(structure: &RepositoryStructure) -> Option<&'static str> {
    let names = listing_names(structure);
    if names.is_empty() {
        return None;
    }
    INDICATOR_TABLE
        .iter()
        .find(|rule| rule.matches_names(&names))
        .map(|rule| rule.label)
}

/// Resolves the project type for a repository
pub fn classify_project(structure: &RepositoryStructure, profile: &BuildProfile) -> ProjectType {
    if let Some(label) = from_framework(profile) {
        debug!(project_type = %label, tier = "framework", "Project type resolved");
        return ProjectType::new(label);
    }

    let tiers: [(&str, Option<&'static str>); 3] = [
        ("readme", from_readme(&structure.readme)),
        ("manifest", from_manifest(structure, profile)),
        ("listing", from_listing(structure)),
    ];
    for (tier, label) in tiers {
        if let Some(label) = label {
            debug!(project_type = label, tier, "Project type resolved");
            return ProjectType::new(label);
        }
    }

    if let Some(language) = structure.languages.dominant() {
        debug!(language, tier = "language", "Project type resolved");
        return ProjectType::new(format!("{} Application", language));
    }

    debug!(tier = "generic", "Project type resolved");
    ProjectType::generic()
}
