//! GitHub token discovery.
//!
//! Order:
//! 1. GITHUB_TOKEN env var (set by CI runners)
//! 2. GH_TOKEN env var
//! 3. `gh auth token` (gh CLI, for local runs)

use std::env;
use std::process::Command;

use crate::error::GitHubError;

/// Get a GitHub token, or `AuthenticationFailed` when none is available.
pub fn get_github_token() -> Result<String, GitHubError> {
    for name in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(name)
            && !token.trim().is_empty()
        {
            return Ok(token);
        }
    }

    get_token_from_gh_cli().ok_or(GitHubError::AuthenticationFailed)
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_token_env_wins() {
        temp_env::with_vars(
            [("GITHUB_TOKEN", Some("ci-token")), ("GH_TOKEN", Some("other"))],
            || {
                assert_eq!(get_github_token().unwrap(), "ci-token");
            },
        );
    }

    #[test]
    fn test_gh_token_used_when_github_token_blank() {
        temp_env::with_vars(
            [("GITHUB_TOKEN", Some("  ")), ("GH_TOKEN", Some("gh-token"))],
            || {
                assert_eq!(get_github_token().unwrap(), "gh-token");
            },
        );
    }
}
