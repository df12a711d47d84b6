//! Local repository queries through the system `git` binary.
//!
//! Commands run with `std::process::Command` in the configured working
//! directory, inheriting the user's git config.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::GitError;

/// Revision range used when there is no pull request to diff.
pub const DEFAULT_RANGE: &str = "HEAD~1..HEAD";

/// Shells out to `git` inside one repository.
#[derive(Debug, Clone)]
pub struct LocalGit {
    workdir: PathBuf,
}

impl LocalGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Check that a `git` executable is on PATH.
    pub fn check_installed() -> Result<(), GitError> {
        which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
    }

    /// Run `git <args>` and return its stdout.
    pub fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::NotInstalled
                } else {
                    GitError::SpawnFailed(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Unified diff for `range` (e.g. `base..head`).
    pub fn diff(&self, range: &str) -> Result<String, GitError> {
        self.run(&["diff", range])
    }

    /// Paths changed in `range`.
    pub fn changed_files(&self, range: &str) -> Result<Vec<String>, GitError> {
        let output = self.run(&["diff", "--name-only", range])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Current branch name; empty on a detached HEAD.
    pub fn current_branch(&self) -> Result<String, GitError> {
        Ok(self.run(&["branch", "--show-current"])?.trim().to_string())
    }

    pub fn last_commit_subject(&self) -> Result<String, GitError> {
        Ok(self.run(&["log", "-1", "--pretty=%s"])?.trim().to_string())
    }

    pub fn last_commit_message(&self) -> Result<String, GitError> {
        Ok(self.run(&["log", "-1", "--pretty=%B"])?.trim().to_string())
    }

    /// Messages of commits on the current branch since it forked from `main_branch`.
    pub fn branch_commit_messages(&self, main_branch: &str) -> Result<String, GitError> {
        let branch = self.current_branch()?;
        let head = if branch.is_empty() { "HEAD" } else { branch.as_str() };

        let ancestor = self.run(&["merge-base", main_branch, head])?;
        let range = format!("{}..{}", ancestor.trim(), head);
        debug!("Reading commit messages for {}", range);

        Ok(self.run(&["log", &range, "--pretty=%B"])?.trim().to_string())
    }

    /// Branch commit messages, or just the latest message when the range
    /// cannot be resolved (missing main branch, shallow clone).
    pub fn commit_messages(&self, main_branch: &str) -> Result<String, GitError> {
        match self.branch_commit_messages(main_branch) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!("Failed to read branch commit messages from local git: {}", e);
                self.last_commit_message()
            }
        }
    }

    /// URL of the named remote.
    pub fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        Ok(self.run(&["remote", "get-url", remote])?.trim().to_string())
    }
}
