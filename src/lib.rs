//! prdraft - drafts pull request descriptions from a repository's changes.
//!
//! # Overview
//!
//! prdraft collects the PR diff (GitHub API first, local `git` as fallback),
//! picks a markdown template by user rules or branch/commit keywords, asks a
//! generative-text provider to fill it, and injects identifiers extracted
//! from commit messages and the branch name into the configured sections.

pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod llm;
pub mod outputs;
pub mod pipeline;
pub mod rules;
pub mod source;
pub mod template;

// Re-export commonly used types
pub use config::{Config, ProjectPaths, UpdateMode};
pub use error::{ConfigError, GitError, GitHubError, OutputError, PipelineError, ProviderError};
pub use llm::{ContentGenerator, HttpGenerator, Provider};
pub use outputs::ActionOutputs;
pub use pipeline::{Pipeline, RunOutcome};
pub use rules::{Condition, ExtractionRule, RulesFile, SelectionRule, TemplateSelection};
pub use source::{ChangeSource, DiffResult, RepoChanges};
pub use template::{ExtractedInfo, TemplateSelector, TemplateStore};
