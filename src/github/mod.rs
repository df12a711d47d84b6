//! GitHub API operations using octocrab, plus the CI event context.

pub mod auth;
pub mod event;
pub mod pulls;

pub use auth::get_github_token;
pub use event::{EventContext, PullRequestPayload, RepoSlug};
pub use pulls::{
    PullRequestCommit, PullRequestFile, build_client, files_to_diff, list_pull_request_commits,
    list_pull_request_files, parse_github_remote,
};
