//! Rule-driven extraction of identifiers from commit messages and branch name.

use std::collections::{BTreeMap, HashSet};

use regex_lite::Regex;
use tracing::warn;

use crate::rules::ExtractionRule;

/// Matches per extraction pattern, deduplicated in first-seen order.
///
/// A pattern with no matches has no entry at all.
pub type ExtractedInfo = BTreeMap<String, Vec<String>>;

/// Run every extraction rule over the commit messages and branch name.
///
/// Rules sharing a pattern accumulate into one bucket. A rule whose pattern
/// does not compile is skipped with a warning.
pub fn extract_info_by_rules(
    commit_messages: &str,
    branch_name: &str,
    rules: &[ExtractionRule],
) -> ExtractedInfo {
    let mut extracted = ExtractedInfo::new();
    if rules.is_empty() {
        return extracted;
    }

    let corpus = format!("{}\n{}", commit_messages, branch_name);

    for rule in rules {
        let re = match Regex::new(&rule.pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping extraction rule with invalid pattern {:?}: {}", rule.pattern, e);
                continue;
            }
        };

        let mut seen = HashSet::new();
        let matches: Vec<String> = re
            .find_iter(&corpus)
            .map(|m| m.as_str())
            .filter(|m| !m.is_empty() && seen.insert(*m))
            .map(str::to_string)
            .collect();

        if !matches.is_empty() {
            extracted
                .entry(rule.pattern.clone())
                .or_default()
                .extend(matches);
        }
    }

    extracted
}
