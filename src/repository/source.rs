use super::RepositoryStructure;
use async_trait::async_trait;
use thiserror::Error;

/// Failures while fetching a repository snapshot.
///
/// These are terminal for an analysis request: without a snapshot there are
/// no signals to synthesize from.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository {owner}/{repo} not found or not accessible")]
    NotFound { owner: String, repo: String },

    #[error("repository host rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<u64> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid repository location: {0}")]
    InvalidLocation(String),

    #[error("failed to read local repository: {0}")]
    Io(#[from] std::io::Error),
}

fn reset_hint(reset_at: &Option<u64>) -> String {
    match reset_at {
        Some(epoch) => format!(" (resets at unix time {epoch})"),
        None => String::new(),
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Produces a [`RepositoryStructure`] for an `owner/repo` at a branch
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<RepositoryStructure, FetchError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message() {
        let err = FetchError::RateLimited {
            reset_at: Some(1_700_000_000),
        };
        assert!(err.to_string().contains("1700000000"));

        let err = FetchError::RateLimited { reset_at: None };
        assert_eq!(err.to_string(), "repository host rate limit exceeded");
    }

    #[test]
    fn test_not_found_message() {
        let err = FetchError::NotFound {
            owner: "octo".to_string(),
            repo: "demo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "repository octo/demo not found or not accessible"
        );
    }
}
