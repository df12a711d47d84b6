//! Runtime configuration and project file loading.
//!
//! Every setting comes from a single environment variable with a documented
//! default. Project files (templates, rules, system prompt) each have a current
//! location under `.github/ai-pr/` and a legacy location that is used only when
//! the current one is missing on disk.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::llm::provider::Provider;
use crate::rules::RulesFile;

pub const TEMPLATE_DIR: &str = ".github/ai-pr/templates";
pub const RULES_PATH: &str = ".github/ai-pr/rules.json";
pub const SYSTEM_PROMPT_PATH: &str = ".github/ai-pr/prompt.md";

pub const LEGACY_TEMPLATE_DIR: &str = ".github/pull_request_templates";
pub const LEGACY_RULES_PATH: &str = ".github/pr-rules.json";
pub const LEGACY_SYSTEM_PROMPT_PATH: &str = ".github/pr-system-prompt.md";

pub const DEFAULT_PROVIDER: &str = "claude";
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_MAIN_BRANCH: &str = "main";

/// How the invoking job should treat the existing PR body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    Always,
    #[default]
    CreateOnly,
    CommentOnly,
}

impl UpdateMode {
    /// Parse a mode name, treating anything unrecognized as `create-only`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "always" => UpdateMode::Always,
            "create-only" => UpdateMode::CreateOnly,
            "comment-only" => UpdateMode::CommentOnly,
            other => {
                warn!("Unknown UPDATE_MODE '{}', using create-only", other);
                UpdateMode::CreateOnly
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Always => "always",
            UpdateMode::CreateOnly => "create-only",
            UpdateMode::CommentOnly => "comment-only",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings sourced from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider name, passed through unmodified to the generator.
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub template_path: Option<String>,
    pub update_mode: UpdateMode,
    pub project_id: Option<String>,
    pub location: String,
    pub main_branch: String,
    /// Per-request bound for generation calls, from `AI_TIMEOUT_SECS`.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        let provider = env_var("AI_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let api_key = resolve_api_key(&provider);
        let model = env_var("MODEL").unwrap_or_else(|| default_model_for(&provider).to_string());

        Self {
            api_key,
            model,
            template_path: env_var("TEMPLATE_PATH"),
            update_mode: env_var("UPDATE_MODE")
                .map(|v| UpdateMode::parse(&v))
                .unwrap_or_default(),
            project_id: env_var("PROJECT_ID"),
            location: env_var("LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            main_branch: env_var("MAIN_BRANCH").unwrap_or_else(|| DEFAULT_MAIN_BRANCH.to_string()),
            request_timeout: env_var("AI_TIMEOUT_SECS").and_then(|v| parse_timeout(&v)),
            provider,
        }
    }
}

/// Read a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Positive whole seconds.
fn parse_timeout(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!("Ignoring invalid AI_TIMEOUT_SECS '{}'", value);
            None
        }
    }
}

/// `API_KEY` wins over the provider-specific variable.
fn resolve_api_key(provider: &str) -> Option<String> {
    if let Some(key) = env_var("API_KEY") {
        return Some(key);
    }

    let name = match provider.parse::<Provider>() {
        Ok(p) => p.api_key_env(),
        Err(_) => Provider::Claude.api_key_env(),
    };
    env_var(name)
}

fn default_model_for(provider: &str) -> &'static str {
    provider
        .parse::<Provider>()
        .unwrap_or(Provider::Claude)
        .default_model()
}

/// Resolved locations of the project's template directory, rules file and
/// system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub template_dir: PathBuf,
    pub rules_path: PathBuf,
    pub system_prompt_path: PathBuf,
}

impl ProjectPaths {
    /// Resolve each path under `root`, falling back independently to its
    /// legacy location when the current one does not exist.
    pub fn resolve(root: &Path, template_override: Option<&str>) -> Self {
        let template_dir = root.join(template_override.unwrap_or(TEMPLATE_DIR));

        Self {
            template_dir: prefer_existing(template_dir, root.join(LEGACY_TEMPLATE_DIR)),
            rules_path: prefer_existing(root.join(RULES_PATH), root.join(LEGACY_RULES_PATH)),
            system_prompt_path: prefer_existing(
                root.join(SYSTEM_PROMPT_PATH),
                root.join(LEGACY_SYSTEM_PROMPT_PATH),
            ),
        }
    }
}

fn prefer_existing(current: PathBuf, legacy: PathBuf) -> PathBuf {
    if !current.exists() && legacy.exists() {
        debug!("Using legacy path {}", legacy.display());
        legacy
    } else {
        current
    }
}

/// Load the rules file, returning `Ok(None)` when it does not exist.
pub fn try_load_rules(path: &Path) -> Result<Option<RulesFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::InvalidRules {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the rules file. Absence or parse failure yields the default rules.
pub fn load_rules(path: &Path) -> RulesFile {
    match try_load_rules(path) {
        Ok(Some(rules)) => rules,
        Ok(None) => RulesFile::default(),
        Err(e) => {
            warn!("Failed to load rules, using defaults: {}", e);
            RulesFile::default()
        }
    }
}

/// Load the system prompt, falling back to the built-in prompt.
pub fn load_system_prompt(path: &Path) -> String {
    if !path.exists() {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    }

    match std::fs::read_to_string(path) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Failed to read system prompt {}: {}", path.display(), e);
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}
