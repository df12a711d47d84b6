//! Change sources: the PR diff, branch, title and commit messages.
//!
//! The GitHub API is tried first when the run belongs to a pull request and
//! a token is available; any API failure falls back to the local `git`
//! binary. Neither path retries.

use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info, warn};

use crate::error::{GitError, GitHubError};
use crate::git::{DEFAULT_RANGE, LocalGit};
use crate::github::{
    EventContext, RepoSlug, build_client, files_to_diff, get_github_token,
    list_pull_request_commits, list_pull_request_files, parse_github_remote,
};

/// Raw unified diff plus the paths it touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub diff: String,
    pub changed_files: Vec<String>,
}

impl DiffResult {
    /// True when there is neither diff text nor any changed path.
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty() && self.changed_files.is_empty()
    }
}

/// Await `primary`; on error log it and return `fallback()` instead.
///
/// The primary error is never propagated.
pub async fn with_fallback<T, E, Fut, F>(what: &str, primary: Fut, fallback: F) -> T
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    F: FnOnce() -> T,
{
    match primary.await {
        Ok(value) => value,
        Err(e) => {
            warn!("{} via GitHub API failed, using local git: {}", what, e);
            fallback()
        }
    }
}

/// Remote provider of pull request changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteChanges: Send + Sync {
    async fn diff(&self) -> Result<DiffResult, GitHubError>;

    /// Newline-joined messages of every commit in the pull request.
    async fn commit_messages(&self) -> Result<String, GitHubError>;
}

/// [`RemoteChanges`] for one GitHub pull request.
pub struct GitHubPullRequest {
    client: Octocrab,
    slug: RepoSlug,
    number: u64,
}

impl GitHubPullRequest {
    pub fn new(client: Octocrab, slug: RepoSlug, number: u64) -> Self {
        Self {
            client,
            slug,
            number,
        }
    }
}

#[async_trait]
impl RemoteChanges for GitHubPullRequest {
    async fn diff(&self) -> Result<DiffResult, GitHubError> {
        let files =
            list_pull_request_files(&self.client, &self.slug.owner, &self.slug.repo, self.number)
                .await?;
        info!("Fetched {} changed files from the GitHub API", files.len());
        Ok(files_to_diff(&files))
    }

    async fn commit_messages(&self) -> Result<String, GitHubError> {
        let commits =
            list_pull_request_commits(&self.client, &self.slug.owner, &self.slug.repo, self.number)
                .await?;
        Ok(commits
            .iter()
            .map(|c| c.commit.message.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Everything the pipeline needs to know about the change being described.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    async fn diff(&self) -> DiffResult;

    /// Active branch name, empty when unknown.
    fn branch_name(&self) -> String;

    /// PR title, empty when unknown.
    fn pr_title(&self) -> String;

    fn last_commit_message(&self) -> Result<String, GitError>;

    async fn commit_messages(&self) -> Result<String, GitError>;
}

/// [`ChangeSource`] over a local checkout, with an optional remote in front.
pub struct RepoChanges {
    local: LocalGit,
    remote: Option<Box<dyn RemoteChanges>>,
    event: EventContext,
    main_branch: String,
}

impl RepoChanges {
    pub fn new(workdir: impl Into<PathBuf>, event: EventContext, main_branch: impl Into<String>) -> Self {
        Self {
            local: LocalGit::new(workdir),
            remote: None,
            event,
            main_branch: main_branch.into(),
        }
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteChanges>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Attach the GitHub API when this run is for a pull request and a token
    /// and repository slug can be found. Otherwise stay local-only.
    pub fn with_github_if_available(self) -> Self {
        let Some(number) = self.event.pull_request.as_ref().map(|pr| pr.number) else {
            debug!("No pull request in event context, using local git only");
            return self;
        };

        let Some(slug) = self.event.repository.clone().or_else(|| self.slug_from_origin()) else {
            warn!("Could not determine repository owner/name, using local git only");
            return self;
        };

        let client = match get_github_token().and_then(|token| build_client(&token)) {
            Ok(client) => client,
            Err(e) => {
                warn!("GitHub API unavailable, using local git only: {}", e);
                return self;
            }
        };

        self.with_remote(Box::new(GitHubPullRequest::new(client, slug, number)))
    }

    fn slug_from_origin(&self) -> Option<RepoSlug> {
        let url = self.local.remote_url("origin").ok()?;
        let (owner, repo) = parse_github_remote(&url).ok()?;
        Some(RepoSlug { owner, repo })
    }

    /// `base..head` for a pull request, otherwise the latest commit.
    fn local_range(&self) -> String {
        match &self.event.pull_request {
            Some(pr) => format!("{}..{}", pr.base.sha, pr.head.sha),
            None => DEFAULT_RANGE.to_string(),
        }
    }

    fn local_diff(&self) -> DiffResult {
        let range = self.local_range();
        info!("Reading diff from local git: {}", range);

        let result = self.local.diff(&range).and_then(|diff| {
            let changed_files = self.local.changed_files(&range)?;
            Ok(DiffResult {
                diff,
                changed_files,
            })
        });

        result.unwrap_or_else(|e| {
            warn!("Local git diff failed: {}", e);
            DiffResult::default()
        })
    }
}

#[async_trait]
impl ChangeSource for RepoChanges {
    async fn diff(&self) -> DiffResult {
        match &self.remote {
            Some(remote) => with_fallback("Diff", remote.diff(), || self.local_diff()).await,
            None => self.local_diff(),
        }
    }

    fn branch_name(&self) -> String {
        if let Some(head) = self.event.head_ref() {
            return head.to_string();
        }

        self.local.current_branch().unwrap_or_else(|e| {
            warn!("Failed to get current branch: {}", e);
            String::new()
        })
    }

    fn pr_title(&self) -> String {
        if let Some(title) = self.event.pr_title() {
            return title.to_string();
        }

        self.local.last_commit_subject().unwrap_or_else(|e| {
            warn!("Failed to read PR title from last commit: {}", e);
            String::new()
        })
    }

    fn last_commit_message(&self) -> Result<String, GitError> {
        self.local.last_commit_message()
    }

    async fn commit_messages(&self) -> Result<String, GitError> {
        let local = || self.local.commit_messages(&self.main_branch);

        match &self.remote {
            Some(remote) => {
                with_fallback("Commit list", async { remote.commit_messages().await.map(Ok) }, local)
                    .await
            }
            None => local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Throwaway repository with two commits on `main` driven through `git`.
    fn init_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let git = LocalGit::new(dir.path());
        git.run(&["init", "-q", "-b", "main"]).unwrap();
        git.run(&["config", "user.name", "Test User"]).unwrap();
        git.run(&["config", "user.email", "test@example.com"]).unwrap();

        for (file, message) in [("a.txt", "chore: init"), ("b.txt", "feat: add b")] {
            std::fs::write(dir.path().join(file), message).unwrap();
            git.run(&["add", file]).unwrap();
            git.run(&["commit", "-q", "-m", message]).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_with_fallback_uses_primary_value() {
        let value = with_fallback("x", async { Ok::<_, String>(1) }, || 2).await;
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_with_fallback_swallows_primary_error() {
        let value = with_fallback("x", async { Err::<i32, _>("boom") }, || 2).await;
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_remote_diff_preferred() {
        let mut remote = MockRemoteChanges::new();
        remote.expect_diff().times(1).returning(|| {
            Ok(DiffResult {
                diff: "remote diff".to_string(),
                changed_files: vec!["remote.rs".to_string()],
            })
        });

        let source = RepoChanges::new("/nonexistent", EventContext::default(), "main")
            .with_remote(Box::new(remote));
        assert_eq!(source.diff().await.diff, "remote diff");
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let repo = init_repo();
        let mut remote = MockRemoteChanges::new();
        remote
            .expect_diff()
            .times(1)
            .returning(|| Err(GitHubError::AuthenticationFailed));
        remote
            .expect_commit_messages()
            .times(1)
            .returning(|| Err(GitHubError::NoPullRequest));

        let source = RepoChanges::new(repo.path(), EventContext::default(), "main")
            .with_remote(Box::new(remote));

        let diff = source.diff().await;
        assert_eq!(diff.changed_files, vec!["b.txt"]);
        assert!(diff.diff.contains("+feat: add b"));

        // On main the merge-base range is empty.
        assert_eq!(source.commit_messages().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_local_failure_yields_empty_diff() {
        let dir = tempfile::tempdir().unwrap();
        let source = RepoChanges::new(dir.path(), EventContext::default(), "main");
        assert!(source.diff().await.is_empty());
        assert_eq!(source.branch_name(), "");
    }

    #[test]
    fn test_branch_and_title_from_local_git() {
        let repo = init_repo();
        let source = RepoChanges::new(repo.path(), EventContext::default(), "main");
        assert_eq!(source.branch_name(), "main");
        assert_eq!(source.pr_title(), "feat: add b");
        assert_eq!(source.last_commit_message().unwrap(), "feat: add b");
    }

    #[test]
    fn test_diff_result_is_empty() {
        assert!(DiffResult::default().is_empty());
        assert!(!DiffResult {
            diff: String::new(),
            changed_files: vec!["a".into()],
        }
        .is_empty());
    }
}
