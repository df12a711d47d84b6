//! Rules file model: content-extraction rules and template-selection rules.
//!
//! The file is JSON with two top-level keys:
//!
//! ```json
//! {
//!   "rules": [{ "pattern": "JIRA-\\d+", "targetSection": "## Related Tickets" }],
//!   "templateSelection": {
//!     "rules": [{ "condition": "branch", "pattern": "^hotfix/", "template": "hotfix", "priority": 1 }],
//!     "defaultTemplate": "feature"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Template used when neither the rules file nor a rule names one.
pub const DEFAULT_TEMPLATE: &str = "feature";

/// Sort key for selection rules without an explicit priority.
pub const UNSET_PRIORITY: i64 = 999;

/// Maps a regex to the template section its matches are injected into.
///
/// The pattern string doubles as the bucket key for extracted matches, so two
/// rules sharing a pattern share one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    pub pattern: String,
    pub target_section: String,
}

/// Which input a selection rule tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    PrTitle,
    Branch,
    Commit,
    /// Any condition name we don't recognize. Rules carrying it are skipped.
    #[serde(other)]
    Unknown,
}

/// Maps a matched title, branch or commit message to a template identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRule {
    pub condition: Condition,
    pub pattern: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl SelectionRule {
    /// Priority used for ordering; unprioritized rules sort last.
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(UNSET_PRIORITY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSelection {
    #[serde(default)]
    pub rules: Vec<SelectionRule>,
    #[serde(default = "default_template")]
    pub default_template: String,
}

impl Default for TemplateSelection {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_template: default_template(),
        }
    }
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// Parsed rules file. Absent or malformed files yield `RulesFile::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesFile {
    #[serde(default)]
    pub rules: Vec<ExtractionRule>,
    #[serde(default)]
    pub template_selection: TemplateSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rules_file() {
        let json = r###"{
            "rules": [{ "pattern": "JIRA-\\d+", "targetSection": "## Related Tickets" }],
            "templateSelection": {
                "rules": [
                    { "condition": "branch", "pattern": "^hotfix/", "template": "hotfix", "priority": 1 },
                    { "condition": "pr_title", "pattern": "release", "template": "release" }
                ],
                "defaultTemplate": "default"
            }
        }"###;

        let file: RulesFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.rules.len(), 1);
        assert_eq!(file.rules[0].target_section, "## Related Tickets");
        assert_eq!(file.template_selection.default_template, "default");
        assert_eq!(file.template_selection.rules[0].condition, Condition::Branch);
        assert_eq!(file.template_selection.rules[1].condition, Condition::PrTitle);
        assert_eq!(file.template_selection.rules[1].effective_priority(), UNSET_PRIORITY);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file: RulesFile = serde_json::from_str("{}").unwrap();
        assert!(file.rules.is_empty());
        assert!(file.template_selection.rules.is_empty());
        assert_eq!(file.template_selection.default_template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_unknown_condition_is_tolerated() {
        let json = r#"{ "condition": "label", "pattern": "x", "template": "feature" }"#;
        let rule: SelectionRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.condition, Condition::Unknown);
    }
}
