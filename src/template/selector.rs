//! Template selection from user rules or built-in keyword tables.

use regex_lite::RegexBuilder;
use tracing::{debug, warn};

use crate::rules::{Condition, SelectionRule, TemplateSelection};

use super::defaults::{BRANCH_KEYWORDS, COMMIT_KEYWORDS};

/// Chooses a template identifier for a change.
#[derive(Debug, Clone, Default)]
pub struct TemplateSelector {
    selection: TemplateSelection,
}

impl TemplateSelector {
    pub fn new(selection: TemplateSelection) -> Self {
        Self { selection }
    }

    pub fn default_template(&self) -> &str {
        &self.selection.default_template
    }

    /// Pick a template for the given PR title, branch and latest commit message.
    ///
    /// User rules are tried first in ascending priority (ties keep file order,
    /// first match wins). Without a match the built-in keyword tables are
    /// consulted, then the configured default. An invalid rule pattern makes
    /// the whole selection degrade to the configured default.
    pub fn select_template(&self, pr_title: &str, branch_name: &str, last_commit: &str) -> String {
        if !self.selection.rules.is_empty() {
            match self.select_by_rules(pr_title, branch_name, last_commit) {
                Ok(Some(template)) => return template,
                Ok(None) => debug!("No template selection rule matched"),
                Err(e) => {
                    warn!("Template selection failed: {}", e);
                    return self.selection.default_template.clone();
                }
            }
        }

        select_by_keywords(branch_name, last_commit)
            .map(str::to_string)
            .unwrap_or_else(|| self.selection.default_template.clone())
    }

    fn select_by_rules(
        &self,
        pr_title: &str,
        branch_name: &str,
        last_commit: &str,
    ) -> Result<Option<String>, regex_lite::Error> {
        let mut rules: Vec<&SelectionRule> = self.selection.rules.iter().collect();
        rules.sort_by_key(|r| r.effective_priority());

        for rule in rules {
            let test_value = match rule.condition {
                Condition::PrTitle => pr_title,
                Condition::Branch => branch_name,
                Condition::Commit => last_commit,
                Condition::Unknown => continue,
            };

            if test_value.is_empty() {
                continue;
            }

            let re = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()?;

            if re.is_match(test_value) {
                debug!(
                    "Template selection rule matched: {:?}={:?} -> {}",
                    rule.condition, test_value, rule.template
                );
                return Ok(Some(rule.template.clone()));
            }
        }

        Ok(None)
    }
}

/// Built-in detection: branch substring first, then commit prefix.
fn select_by_keywords(branch_name: &str, last_commit: &str) -> Option<&'static str> {
    let by_branch = BRANCH_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| branch_name.contains(k)))
        .map(|(template, _)| *template);

    if by_branch.is_some() {
        return by_branch;
    }

    let commit = last_commit.to_lowercase();
    COMMIT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| commit.starts_with(k)))
        .map(|(template, _)| *template)
}
