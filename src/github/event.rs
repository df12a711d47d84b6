//! Pull request event context supplied by the CI runner.
//!
//! The runner writes the triggering webhook payload to the file named by
//! `GITHUB_EVENT_PATH` and the repository slug to `GITHUB_REPOSITORY`.

use std::env;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::config::UpdateMode;
use crate::error::GitHubError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub base: GitRefPayload,
    pub head: GitRefPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRefPayload {
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub ref_name: Option<String>,
}

/// `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// What the run knows about the triggering event.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestPayload>,
    pub repository: Option<RepoSlug>,
}

impl EventContext {
    /// Read the event from the runner's environment. Missing or unreadable
    /// payloads produce a context without a pull request.
    pub fn from_env() -> Self {
        let repository = env::var("GITHUB_REPOSITORY").ok();
        let event_path = env::var("GITHUB_EVENT_PATH").ok();

        match Self::load(event_path.as_deref().map(Path::new), repository.as_deref()) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Ignoring event payload: {}", e);
                Self {
                    repository: repository.as_deref().and_then(RepoSlug::parse),
                    ..Self::default()
                }
            }
        }
    }

    pub fn load(event_path: Option<&Path>, repository: Option<&str>) -> Result<Self, GitHubError> {
        let repository = repository.and_then(RepoSlug::parse);

        let Some(path) = event_path.filter(|p| p.is_file()) else {
            return Ok(Self {
                repository,
                ..Self::default()
            });
        };

        let content = std::fs::read_to_string(path).map_err(|source| GitHubError::EventRead {
            path: path.to_path_buf(),
            source,
        })?;
        let event: PullRequestEvent =
            serde_json::from_str(&content).map_err(GitHubError::EventParse)?;

        Ok(Self {
            action: event.action,
            pull_request: event.pull_request,
            repository,
        })
    }

    pub fn pr_title(&self) -> Option<&str> {
        self.pull_request.as_ref().and_then(|pr| pr.title.as_deref())
    }

    pub fn head_ref(&self) -> Option<&str> {
        self.pull_request
            .as_ref()
            .and_then(|pr| pr.head.ref_name.as_deref())
            .filter(|r| !r.is_empty())
    }

    /// Whether the invoking job should overwrite the PR body.
    pub fn should_update_body(&self, mode: UpdateMode) -> bool {
        let Some(pr) = &self.pull_request else {
            return false;
        };

        let opened = self.action.as_deref() == Some("opened");
        let body_blank = pr.body.as_deref().unwrap_or("").trim().is_empty();

        match mode {
            UpdateMode::Always => true,
            UpdateMode::CommentOnly => false,
            UpdateMode::CreateOnly => opened || body_blank,
        }
    }
}
