//! Pull request files and commits via octocrab.

use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GitHubError;
use crate::source::DiffResult;

const PER_PAGE: u8 = 100;

/// Safety limit to prevent runaway pagination.
const MAX_PAGES: u32 = 50;

/// One entry from the "list pull request files" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub sha: Option<String>,
    /// Unified-diff hunk text; absent for binary or very large files.
    #[serde(default)]
    pub patch: Option<String>,
}

/// One entry from the "list commits on a pull request" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

/// Build an authenticated octocrab client.
pub fn build_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::Request(Box::new(e)))
}

/// List every file changed by a pull request.
pub async fn list_pull_request_files(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<PullRequestFile>, GitHubError> {
    let route = format!("/repos/{}/{}/pulls/{}/files", owner, repo, number);
    get_all_pages(octocrab, &route, owner, repo).await
}

/// List every commit on a pull request.
pub async fn list_pull_request_commits(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<PullRequestCommit>, GitHubError> {
    let route = format!("/repos/{}/{}/pulls/{}/commits", owner, repo, number);
    get_all_pages(octocrab, &route, owner, repo).await
}

async fn get_all_pages<T: DeserializeOwned>(
    octocrab: &Octocrab,
    route: &str,
    owner: &str,
    repo: &str,
) -> Result<Vec<T>, GitHubError> {
    let mut all = Vec::new();
    let mut page = 1u32;

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<T> = octocrab
            .get(route, Some(&params))
            .await
            .map_err(|e| classify_error(e, owner, repo))?;

        let count = items.len();
        all.extend(items);

        if count < usize::from(PER_PAGE) {
            break;
        }

        page += 1;
        if page > MAX_PAGES {
            warn!(
                "Reached {}-page safety limit while fetching {}",
                MAX_PAGES, route
            );
            break;
        }
    }

    debug!("Fetched {} items from {}", all.len(), route);
    Ok(all)
}

/// Map an octocrab failure onto our error kinds.
fn classify_error(e: octocrab::Error, owner: &str, repo: &str) -> GitHubError {
    // Check both Display and Debug output to handle different octocrab error formats
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);

    if err_display.to_lowercase().contains("rate limit")
        || err_debug.to_lowercase().contains("rate limit")
    {
        return GitHubError::RateLimited {
            reset_time: "unknown".to_string(),
        };
    }
    if err_display.contains("Not Found") || err_debug.contains("Not Found") {
        return GitHubError::RepositoryNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
        };
    }
    GitHubError::Request(Box::new(e))
}

/// Concatenate file patches into one unified diff.
///
/// Each patch gets synthesized `diff --git`, `index`, `---` and `+++` header
/// lines. Removed files contribute their patch but are left out of the
/// changed-file list.
pub fn files_to_diff(files: &[PullRequestFile]) -> DiffResult {
    let changed_files = files
        .iter()
        .filter(|f| f.status != "removed")
        .map(|f| f.filename.clone())
        .collect();

    let mut diff = String::new();
    for file in files {
        let Some(patch) = &file.patch else {
            continue;
        };
        let sha = file.sha.as_deref().unwrap_or("0000000");
        diff.push_str(&format!("diff --git a/{0} b/{0}\n", file.filename));
        diff.push_str(&format!("index {0}..{0} 100644\n", sha));
        diff.push_str(&format!("--- a/{}\n", file.filename));
        diff.push_str(&format!("+++ b/{}\n", file.filename));
        diff.push_str(patch);
        diff.push('\n');
    }

    DiffResult {
        diff,
        changed_files,
    }
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<(String, String), GitHubError> {
    // SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    // HTTPS format: https://github.com/owner/repo.git
    if url.contains("github.com/") {
        let path = url
            .split("github.com/")
            .nth(1)
            .ok_or(GitHubError::InvalidRepositoryUrl)?;
        return parse_owner_repo_path(path);
    }

    Err(GitHubError::InvalidRepositoryUrl)
}

fn parse_owner_repo_path(path: &str) -> Result<(String, String), GitHubError> {
    let path = path.trim().strip_suffix(".git").unwrap_or(path.trim());
    let parts: Vec<&str> = path.split('/').collect();

    if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        Ok((parts[0].to_string(), parts[1].to_string()))
    } else {
        Err(GitHubError::InvalidRepositoryUrl)
    }
}
