//! Per-ecosystem dependency manifest analyzers
//!
//! Each analyzer turns one manifest into a [`BuildProfile`]. Analyzers may
//! fail; the extractor swaps a failure for [`ManifestAnalyzer::degraded`].

pub mod cargo;
pub mod go_mod;
pub mod jvm;
pub mod npm;
pub mod python;

use super::profile::BuildProfile;
use crate::repository::RepositoryStructure;
use crate::stack::BuildSystemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unexpected manifest shape: {0}")]
    Shape(String),
}

pub trait ManifestAnalyzer: Send + Sync {
    /// Build system reported when the manifest cannot be analyzed
    fn build_system(&self) -> BuildSystemId;

    /// File names this analyzer handles, compared case-insensitively
    fn manifest_names(&self) -> &[&'static str];

    /// Tools listed on a degraded profile
    fn minimal_tools(&self) -> &[&'static str];

    fn analyze(
        &self,
        content: &str,
        structure: &RepositoryStructure,
    ) -> Result<BuildProfile, ManifestError>;

    fn degraded(&self) -> BuildProfile {
        BuildProfile::minimal(self.build_system(), self.minimal_tools())
    }

    /// First manifest name present among the structure's key files
    fn find_manifest<'a>(&self, structure: &'a RepositoryStructure) -> Option<(String, &'a str)> {
        self.manifest_names().iter().find_map(|name| {
            structure
                .key_files
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(key, content)| (key.clone(), content.as_str()))
        })
    }
}

/// Leading package name of a requirement specifier (`Django>=4.0` -> `Django`)
pub(crate) fn requirement_name(spec: &str) -> Option<String> {
    let name: String = spec
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    match name.chars().next() {
        Some(first) if first.is_ascii_alphanumeric() => Some(name),
        _ => None,
    }
}
