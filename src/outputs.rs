//! Key/value status outputs for the invoking CI job.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::OutputError;

pub const TEMPLATE_USED: &str = "template-used";
pub const CONTENT_GENERATED: &str = "content-generated";
pub const SHOULD_UPDATE_BODY: &str = "should-update-body";

/// Writes outputs to the `GITHUB_OUTPUT` file, or as `::set-output`
/// workflow commands on stdout when that file is not configured.
#[derive(Debug, Clone, Default)]
pub struct ActionOutputs {
    path: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn from_env() -> Self {
        Self {
            path: env::var_os("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn stdout() -> Self {
        Self { path: None }
    }

    pub fn set(&self, name: &str, value: &str) -> Result<(), OutputError> {
        debug!("Output {}={}", name, value);

        let Some(path) = &self.path else {
            println!("::set-output name={}::{}", name, value);
            return Ok(());
        };

        let append = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}={}", name, value)
        };

        append().map_err(|source| OutputError::AppendFailed {
            path: path.clone(),
            source,
        })
    }

    pub fn set_bool(&self, name: &str, value: bool) -> Result<(), OutputError> {
        self.set(name, if value { "true" } else { "false" })
    }
}
