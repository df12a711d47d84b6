//! Error types for prdraft modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the local `git` binary.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Set GITHUB_TOKEN or run 'gh auth login'"
    )]
    AuthenticationFailed,

    #[error("GitHub API request failed: {0}")]
    Request(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API. Resets at: {reset_time}")]
    RateLimited { reset_time: String },

    #[error("Repository or pull request not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Failed to parse repository URL")]
    InvalidRepositoryUrl,

    #[error("No pull request in the current event context")]
    NoPullRequest,

    #[error("Failed to read event payload {path}: {source}")]
    EventRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse event payload: {0}")]
    EventParse(#[source] serde_json::Error),
}

/// Errors from a generative-text provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unsupported AI provider: {0}")]
    Unsupported(String),

    #[error("PROJECT_ID environment variable is required for Vertex AI")]
    MissingProjectId,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error: HTTP {status} - {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned no text")]
    EmptyResponse(&'static str),
}

/// Errors from loading project configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rules file {path}: {source}")]
    InvalidRules {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the CI outputs channel.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to append to outputs file {path}: {source}")]
    AppendFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors from a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
