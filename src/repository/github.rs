use super::{
    excerpt, is_key_file, is_readme, FetchError, FileEntry, LanguageHistogram,
    RepositoryMetadata, RepositorySource, RepositoryStructure,
};
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("pipeforge/", env!("CARGO_PKG_VERSION"));

/// Owner and repository name parsed from a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

/// Parses `https://github.com/<owner>/<repo>[.git]` and close variants
///
/// Extra path segments (`/tree/main/...`) are ignored.
pub fn parse_github_url(url: &str) -> Result<RepoRef, FetchError> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    let mut parts = without_scheme.split('/').filter(|part| !part.is_empty());
    let host = parts
        .next()
        .ok_or_else(|| FetchError::InvalidLocation(url.to_string()))?
        .to_lowercase();

    if host != "github.com" && host != "www.github.com" {
        return Err(FetchError::InvalidLocation(format!(
            "{url} is not a GitHub repository URL"
        )));
    }

    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) => Ok(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(FetchError::InvalidLocation(format!(
            "{url} does not name an owner and repository"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    has_projects: bool,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    clone_url: Option<String>,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    stargazers_count: u64,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    download_url: Option<String>,
}

/// Fetches repository snapshots through the GitHub REST API
pub struct GitHubSource {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubSource {
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            token,
        })
    }

    /// Points the source at a different API root (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        owner: &str,
        repo: &str,
    ) -> Result<T, FetchError> {
        debug!(url, "GitHub API request");
        let response = self.get(url).send().await?;
        let response = check_status(response, owner, repo)?;
        Ok(response.json::<T>().await?)
    }

    async fn download(&self, url: &str) -> Option<String> {
        let response = match self.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(url, status = %response.status(), "Key file download failed");
                return None;
            }
            Err(e) => {
                warn!(url, error = %e, "Key file download failed");
                return None;
            }
        };
        response.text().await.ok()
    }
}

fn check_status(response: Response, owner: &str, repo: &str) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let remaining = header_u64(&response, "x-ratelimit-remaining");
    match status {
        StatusCode::NOT_FOUND => Err(FetchError::NotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited {
            reset_at: header_u64(&response, "x-ratelimit-reset"),
        }),
        StatusCode::FORBIDDEN if remaining == Some(0) => Err(FetchError::RateLimited {
            reset_at: header_u64(&response, "x-ratelimit-reset"),
        }),
        // Private repositories answer 403 without credentials
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(FetchError::NotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        other => Err(FetchError::Transport(format!(
            "GitHub API returned {other} for {owner}/{repo}"
        ))),
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

#[async_trait]
impl RepositorySource for GitHubSource {
    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<RepositoryStructure, FetchError> {
        info!(owner, repo, branch, "Fetching repository structure");

        let repo_url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        let info: RepoInfo = self.get_json(&repo_url, owner, repo).await?;

        let contents_url = format!("{}/contents?ref={}", repo_url, branch);
        let contents: Vec<ContentItem> = self.get_json(&contents_url, owner, repo).await?;

        let mut structure = RepositoryStructure {
            metadata: RepositoryMetadata {
                name: info.name,
                description: info.description.unwrap_or_default(),
                size: info.size,
                topics: info.topics,
                default_branch: info.default_branch.unwrap_or_else(|| "main".to_string()),
                is_private: info.private,
                has_issues: info.has_issues,
                has_projects: info.has_projects,
                has_wiki: info.has_wiki,
                primary_language: info.language,
                clone_url: info.clone_url,
                forks_count: info.forks_count,
                stars_count: info.stargazers_count,
            },
            ..Default::default()
        };

        for item in contents {
            match item.kind.as_str() {
                "file" => {
                    if is_key_file(&item.name) {
                        if let Some(url) = item.download_url.as_deref() {
                            if let Some(content) = self.download(url).await {
                                if is_readme(&item.name) && structure.readme.is_empty() {
                                    structure.readme = content.clone();
                                }
                                structure
                                    .key_files
                                    .insert(item.name.clone(), excerpt(&content));
                            }
                        }
                    }
                    structure.files.push(FileEntry::new(item.name, item.size));
                }
                "dir" => structure.directories.push(item.name),
                _ => {}
            }
        }

        let languages_url = format!("{}/languages", repo_url);
        structure.languages = match self
            .get_json::<BTreeMap<String, u64>>(&languages_url, owner, repo)
            .await
        {
            Ok(map) => map.into_iter().collect::<LanguageHistogram>(),
            Err(e) => {
                warn!(error = %e, "Language histogram unavailable");
                LanguageHistogram::new()
            }
        };

        structure.truncate_listing();

        info!(
            files = structure.files.len(),
            directories = structure.directories.len(),
            key_files = structure.key_files.len(),
            languages = structure.languages.len(),
            "Repository structure fetched"
        );

        Ok(structure)
    }

    fn name(&self) -> &str {
        "github"
    }
}

impl std::fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSource")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
