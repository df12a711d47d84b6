//! Template lookup: project file first, then built-in text.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::defaults::builtin_or_generic;

/// Maps template identifiers to markdown text.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    template_dir: PathBuf,
}

impl TemplateStore {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Read `<template_dir>/<identifier>.md`, falling back to built-in text.
    ///
    /// Never fails and never returns an empty string: an unreadable or empty
    /// file is treated like a missing one.
    pub fn read_template(&self, identifier: &str) -> String {
        let path = self.template_dir.join(format!("{}.md", identifier));

        if path.is_file() {
            match std::fs::read_to_string(&path) {
                Ok(content) if !content.trim().is_empty() => return content,
                Ok(_) => warn!("Template {} is empty, using built-in", path.display()),
                Err(e) => warn!("Failed to read template {}: {}", path.display(), e),
            }
        } else {
            debug!("Template file not found, using built-in: {}", path.display());
        }

        builtin_or_generic(identifier).to_string()
    }
}
