//! Repository snapshot model and the sources that produce it
//!
//! A [`RepositoryStructure`] is fetched once per analysis request and thrown
//! away afterwards. It carries just enough of the repository to classify it:
//! the root listing, a handful of key file excerpts, the language histogram
//! and the README text.

mod github;
mod local;
mod source;

pub use github::{parse_github_url, GitHubSource, RepoRef};
pub use local::LocalSource;
pub use source::{FetchError, RepositorySource};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of root files kept in a snapshot
pub const MAX_FILES: usize = 200;
/// Maximum number of root directories kept in a snapshot
pub const MAX_DIRECTORIES: usize = 50;
/// Key file excerpts are truncated to this many characters
pub const KEY_FILE_EXCERPT_CHARS: usize = 3000;

/// Root-level files whose content is worth capturing (compared lower-cased)
const KEY_FILE_NAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "requirements.txt",
    "pipfile",
    "pipfile.lock",
    "setup.py",
    "pyproject.toml",
    "setup.cfg",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "gradle.properties",
    "composer.json",
    "composer.lock",
    "go.mod",
    "go.sum",
    "cargo.toml",
    "cargo.lock",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "makefile",
    "jenkinsfile",
    ".travis.yml",
    ".gitlab-ci.yml",
    "azure-pipelines.yml",
    "angular.json",
    "vue.config.js",
    "next.config.js",
    "nuxt.config.js",
    "vite.config.js",
    "webpack.config.js",
    "tsconfig.json",
    "jest.config.js",
    "cypress.json",
    "pytest.ini",
    "tox.ini",
    "application.properties",
    "manage.py",
    "app.py",
    "main.py",
    "index.js",
    "server.js",
    "run.sh",
    "start.sh",
    "build.sh",
    "install.sh",
    "run.bat",
    "start.bat",
    "build.bat",
];

/// True when a root file should have its content captured
pub fn is_key_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    is_readme(&lower) || KEY_FILE_NAMES.contains(&lower.as_str())
}

/// True for README-like file names (`README.md`, `read_me.txt`, ...)
pub fn is_readme(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("readme") || lower.starts_with("read_me")
}

/// Truncates a key file to the excerpt budget on a char boundary
pub fn excerpt(content: &str) -> String {
    content.chars().take(KEY_FILE_EXCERPT_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Descriptive metadata about the repository as reported by its host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub name: String,
    pub description: String,
    /// Size in kilobytes
    pub size: u64,
    pub topics: Vec<String>,
    pub default_branch: String,
    pub is_private: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub primary_language: Option<String>,
    pub clone_url: Option<String>,
    pub forks_count: u64,
    pub stars_count: u64,
}

/// Language name to byte count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageHistogram(BTreeMap<String, u64>);

impl LanguageHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: impl Into<String>, bytes: u64) {
        *self.0.entry(language.into()).or_insert(0) += bytes;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn bytes(&self, language: &str) -> Option<u64> {
        self.0.get(language).copied()
    }

    /// Language with the most bytes; ties go to the alphabetically first name
    pub fn dominant(&self) -> Option<&str> {
        self.0
            .iter()
            .max_by(|(name_a, bytes_a), (name_b, bytes_b)| {
                bytes_a.cmp(bytes_b).then_with(|| name_b.cmp(name_a))
            })
            .map(|(name, _)| name.as_str())
    }

    /// Language names ordered by byte count, largest first
    pub fn ranked(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &u64)> = self.0.iter().collect();
        entries.sort_by(|(name_a, bytes_a), (name_b, bytes_b)| {
            bytes_b.cmp(bytes_a).then_with(|| name_a.cmp(name_b))
        });
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }
}

impl FromIterator<(String, u64)> for LanguageHistogram {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut histogram = Self::new();
        for (language, bytes) in iter {
            histogram.insert(language, bytes);
        }
        histogram
    }
}

/// Snapshot of a repository used as the sole input of an analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStructure {
    pub files: Vec<FileEntry>,
    pub directories: Vec<String>,
    /// File name to content excerpt, names as they appear in the repository
    pub key_files: BTreeMap<String, String>,
    pub languages: LanguageHistogram,
    pub readme: String,
    pub metadata: RepositoryMetadata,
}

impl RepositoryStructure {
    /// Case-insensitive lookup of a key file excerpt
    pub fn key_file(&self, name: &str) -> Option<&str> {
        self.key_files
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, content)| content.as_str())
    }

    pub fn has_key_file(&self, name: &str) -> bool {
        self.key_file(name).is_some()
    }

    /// True when the file is present in the listing or among the key files
    pub fn has_file(&self, name: &str) -> bool {
        self.has_key_file(name)
            || self
                .files
                .iter()
                .any(|file| file.name.eq_ignore_ascii_case(name))
    }

    pub fn has_directory(&self, name: &str) -> bool {
        self.directories
            .iter()
            .any(|dir| dir.eq_ignore_ascii_case(name))
    }

    /// Lower-cased file and directory names, used by indicator matching
    pub fn lowercase_names(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|file| file.name.to_lowercase())
            .chain(self.directories.iter().map(|dir| dir.to_lowercase()))
            .chain(self.key_files.keys().map(|key| key.to_lowercase()))
            .collect()
    }

    /// Applies the listing caps shared by every source
    pub fn truncate_listing(&mut self) {
        self.files.truncate(MAX_FILES);
        self.directories.truncate(MAX_DIRECTORIES);
    }
}
