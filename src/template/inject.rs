//! Injection of generated and rule-extracted content into a template.
//!
//! The template is parsed once into lines, edited in place per rule, and
//! rendered once. Splitting on `\n` and joining with `\n` round-trips the
//! original text exactly, so untouched regions are preserved byte for byte.

use tracing::{debug, warn};

use crate::llm::AI_PLACEHOLDER;
use crate::rules::ExtractionRule;

use super::extract::ExtractedInfo;

/// Marker written into sections that have nothing to report.
pub const NOT_APPLICABLE: &str = "N/A";

/// Combine the generator's output with the template it was asked to fill.
///
/// Without generated text the template is carried forward unchanged.
/// Otherwise a surrounding code fence is stripped and any placeholder the
/// model left behind becomes [`NOT_APPLICABLE`].
pub fn merge_generated_content(generated: Option<&str>, template: &str) -> String {
    match generated {
        Some(text) => strip_code_fence(text).replace(AI_PLACEHOLDER, NOT_APPLICABLE),
        None => template.to_string(),
    }
}

/// Remove a ```` ```markdown ```` (or bare ```` ``` ````) fence wrapping the whole text.
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (`markdown`, `md`, ...) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

/// Apply extraction rules to `template`, in rule order.
///
/// For a rule with matches, bullets replace the placeholder under the target
/// heading, or are inserted right after the heading when there is no
/// placeholder, or are appended under a new heading when the heading is
/// missing. For a rule without matches, a dash placeholder under the heading
/// becomes `N/A`.
///
/// Bullets already present in the target section are not inserted again, so
/// re-applying the same rules to the output leaves it unchanged. A placeholder
/// whose items are all listed already is removed.
pub fn apply_rules_to_template(
    template: &str,
    extracted: &ExtractedInfo,
    rules: &[ExtractionRule],
) -> String {
    let mut doc = Document::parse(template);

    for rule in rules {
        let section = rule.target_section.as_str();
        if section.trim().is_empty() {
            warn!("Skipping extraction rule {:?} with empty targetSection", rule.pattern);
            continue;
        }

        match extracted.get(&rule.pattern).filter(|items| !items.is_empty()) {
            Some(items) => doc.inject_items(section, items),
            None => doc.mark_not_applicable(section),
        }
    }

    doc.render()
}

/// Line-oriented view of a markdown document.
struct Document {
    lines: Vec<String>,
}

impl Document {
    fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// First heading line containing `target` (case-insensitive), else the
    /// first line of any kind containing it.
    fn find_heading(&self, target: &str) -> Option<usize> {
        let needle = target.trim().to_lowercase();
        let contains = |line: &String| line.to_lowercase().contains(&needle);

        self.lines
            .iter()
            .position(|line| is_heading(line) && contains(line))
            .or_else(|| self.lines.iter().position(contains))
    }

    /// Index of a placeholder line following `heading`, skipping blank lines.
    fn placeholder_after(&self, heading: usize, allow_not_applicable: bool) -> Option<usize> {
        let idx = (heading + 1..self.lines.len()).find(|&i| !self.lines[i].trim().is_empty())?;
        let line = self.lines[idx].trim();

        let is_placeholder =
            line == "-" || (allow_not_applicable && line.eq_ignore_ascii_case(NOT_APPLICABLE));
        is_placeholder.then_some(idx)
    }

    /// Lines between `heading` and the next heading.
    fn section_body(&self, heading: usize) -> &[String] {
        let end = (heading + 1..self.lines.len())
            .find(|&i| is_heading(&self.lines[i]))
            .unwrap_or(self.lines.len());
        &self.lines[heading + 1..end]
    }

    /// `section` is matched trimmed but appended verbatim.
    fn inject_items(&mut self, section: &str, items: &[String]) {
        let Some(heading) = self.find_heading(section) else {
            debug!("Section {:?} not in template, appending", section);
            self.lines.push(String::new());
            self.lines.push(section.to_string());
            self.lines.extend(items.iter().map(|item| bullet(item)));
            return;
        };

        let body = self.section_body(heading);
        let bullets: Vec<String> = items
            .iter()
            .map(|item| bullet(item))
            .filter(|b| !body.iter().any(|line| line.trim_end() == b))
            .collect();

        // A placeholder is always resolved, and dropped when every item is
        // already listed in the section.
        match self.placeholder_after(heading, true) {
            Some(placeholder) => {
                self.lines.splice(placeholder..=placeholder, bullets);
            }
            None if !bullets.is_empty() => {
                self.lines.splice(heading + 1..heading + 1, bullets);
            }
            None => {}
        }
    }

    fn mark_not_applicable(&mut self, target: &str) {
        if let Some(heading) = self.find_heading(target)
            && let Some(placeholder) = self.placeholder_after(heading, false)
        {
            self.lines[placeholder] = NOT_APPLICABLE.to_string();
        }
    }
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn bullet(item: &str) -> String {
    format!("- {}", item)
}
