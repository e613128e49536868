use super::{
    excerpt, is_key_file, is_readme, FetchError, FileEntry, LanguageHistogram,
    RepositoryMetadata, RepositorySource, RepositoryStructure,
};
use async_trait::async_trait;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MAX_DEPTH: usize = 10;
const MAX_SCANNED_FILES: usize = 5000;

/// Language attributed to a file extension for the byte histogram
fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        "py" => "Python",
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "go" => "Go",
        "rs" => "Rust",
        "rb" => "Ruby",
        "php" => "PHP",
        "cs" => "C#",
        "c" | "h" => "C",
        "cpp" | "cc" | "hpp" => "C++",
        "swift" => "Swift",
        "scala" => "Scala",
        "ex" | "exs" => "Elixir",
        "html" | "htm" => "HTML",
        "css" | "scss" => "CSS",
        "sh" | "bash" => "Shell",
        "vue" => "Vue",
        "dart" => "Dart",
        _ => return None,
    };
    Some(language)
}

/// Builds a snapshot from a checked-out directory, honouring `.gitignore`
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FetchError::InvalidLocation(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name, used as the repository name
    pub fn repo_name(&self) -> String {
        self.root
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("repository")
            .to_string()
    }

    /// Scans the directory into a snapshot
    pub fn scan(&self) -> Result<RepositoryStructure, FetchError> {
        let mut structure = RepositoryStructure {
            metadata: RepositoryMetadata {
                name: self.repo_name(),
                default_branch: "main".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut root_entries: Vec<_> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .collect();
        root_entries.sort_by_key(|entry| entry.file_name());

        for entry in root_entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if name == ".git" {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                structure.directories.push(name);
            } else if file_type.is_file() {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                if is_key_file(&name) {
                    match fs::read_to_string(entry.path()) {
                        Ok(content) => {
                            if is_readme(&name) && structure.readme.is_empty() {
                                structure.readme = content.clone();
                            }
                            structure.key_files.insert(name.clone(), excerpt(&content));
                        }
                        Err(e) => warn!(file = %name, error = %e, "Skipping unreadable key file"),
                    }
                }
                structure.files.push(FileEntry::new(name, size));
            }
        }

        structure.languages = self.language_histogram();
        structure.metadata.primary_language =
            structure.languages.dominant().map(str::to_string);
        structure.metadata.size = structure
            .files
            .iter()
            .map(|file| file.size)
            .sum::<u64>()
            / 1024;
        structure.truncate_listing();

        Ok(structure)
    }

    fn language_histogram(&self) -> LanguageHistogram {
        let mut histogram = LanguageHistogram::new();
        let mut scanned = 0usize;

        for result in WalkBuilder::new(&self.root)
            .max_depth(Some(MAX_DEPTH))
            .hidden(true)
            .git_ignore(true)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if scanned >= MAX_SCANNED_FILES {
                debug!(scanned, "Reached scan limit for language histogram");
                break;
            }
            scanned += 1;

            let language = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase())
                .and_then(|ext| language_for_extension(&ext));
            if let Some(language) = language {
                let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
                histogram.insert(language, bytes);
            }
        }

        histogram
    }
}

#[async_trait]
impl RepositorySource for LocalSource {
    /// Local checkouts have no owner; `repo` overrides the directory name when set
    async fn fetch(
        &self,
        _owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<RepositoryStructure, FetchError> {
        info!(root = %self.root.display(), "Scanning local repository");
        let source = self.clone();
        let mut structure = tokio::task::spawn_blocking(move || source.scan())
            .await
            .map_err(|e| FetchError::Transport(format!("scan task failed: {e}")))??;

        if !repo.is_empty() {
            structure.metadata.name = repo.to_string();
        }
        if !branch.is_empty() {
            structure.metadata.default_branch = branch.to_string();
        }
        Ok(structure)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_collects_key_files_and_readme() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "README.md", "# Demo\n\n```\n$ python app.py\n```\n");
        write(temp.path(), "requirements.txt", "flask==2.0\n");
        write(temp.path(), "app.py", "print('hi')\n");
        write(temp.path(), "notes.txt", "ignored content");
        write(temp.path(), "src/lib.py", "x = 1\n");

        let source = LocalSource::new(temp.path()).unwrap();
        let structure = source.scan().unwrap();

        assert!(structure.readme.contains("python app.py"));
        assert_eq!(structure.key_file("requirements.txt"), Some("flask==2.0\n"));
        assert!(structure.key_file("notes.txt").is_none());
        assert!(structure.has_file("notes.txt"));
        assert_eq!(structure.directories, vec!["src".to_string()]);
        assert_eq!(structure.languages.dominant(), Some("Python"));
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let result = LocalSource::new("/definitely/not/here");
        assert!(matches!(result, Err(FetchError::InvalidLocation(_))));
    }

    #[tokio::test]
    async fn test_fetch_overrides_name_and_branch() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "main.go", "package main\n");

        let source = LocalSource::new(temp.path()).unwrap();
        let structure = source.fetch("", "demo", "develop").await.unwrap();

        assert_eq!(structure.metadata.name, "demo");
        assert_eq!(structure.metadata.default_branch, "develop");
        assert_eq!(structure.languages.dominant(), Some("Go"));
    }
}
