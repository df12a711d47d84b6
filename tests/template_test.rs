//! Template selection, extraction and injection through the public API.

use prdraft::rules::{Condition, ExtractionRule, SelectionRule, TemplateSelection};
use prdraft::template::{
    ExtractedInfo, TemplateSelector, apply_rules_to_template, extract_info_by_rules,
};

const TICKETS: &str = r"JIRA-\d+";
const TEMPLATE: &str = "## Summary\nSomething\n\n## Related Tickets\n-\n";

fn selection_rule(condition: Condition, pattern: &str, template: &str, priority: Option<i64>) -> SelectionRule {
    SelectionRule {
        condition,
        pattern: pattern.to_string(),
        template: template.to_string(),
        priority,
    }
}

fn ticket_rules() -> Vec<ExtractionRule> {
    vec![ExtractionRule {
        pattern: TICKETS.to_string(),
        target_section: "Related Tickets".to_string(),
    }]
}

#[test]
fn test_lowest_priority_number_wins_across_conditions() {
    let selector = TemplateSelector::new(TemplateSelection {
        rules: vec![
            selection_rule(Condition::PrTitle, "login", "title-match", None),
            selection_rule(Condition::Commit, "^feat", "commit-match", Some(5)),
            selection_rule(Condition::Branch, "feature/", "branch-match", Some(2)),
            selection_rule(Condition::Branch, "login", "tied-later", Some(2)),
        ],
        default_template: "feature".to_string(),
    });

    let chosen = selector.select_template("Add login", "feature/login", "feat: login");
    assert_eq!(chosen, "branch-match");
}

#[test]
fn test_builtin_detection_without_rules() {
    let selector = TemplateSelector::new(TemplateSelection::default());

    assert_eq!(selector.select_template("", "feature/login", ""), "feature");
    assert_eq!(selector.select_template("", "hotfix-123", ""), "hotfix");
    assert_eq!(selector.select_template("", "chore/deps", "fix: null check"), "bugfix");
}

#[test]
fn test_extraction_deduplicates_across_commits_and_branch() {
    let rules = ticket_rules();
    let info = extract_info_by_rules(
        "JIRA-100 start\nJIRA-100 follow-up",
        "feature/JIRA-100-login",
        &rules,
    );
    assert_eq!(info[TICKETS], vec!["JIRA-100"]);

    assert!(extract_info_by_rules("JIRA-100", "JIRA-100", &[]).is_empty());
}

#[test]
fn test_injection_cases() {
    let rules = ticket_rules();

    let mut found = ExtractedInfo::new();
    found.insert(TICKETS.to_string(), vec!["JIRA-100".into(), "JIRA-200".into()]);

    let filled = apply_rules_to_template(TEMPLATE, &found, &rules);
    assert_eq!(
        filled,
        "## Summary\nSomething\n\n## Related Tickets\n- JIRA-100\n- JIRA-200\n"
    );

    let empty = apply_rules_to_template(TEMPLATE, &ExtractedInfo::new(), &rules);
    assert_eq!(empty, "## Summary\nSomething\n\n## Related Tickets\nN/A\n");

    let without_heading = "## Summary\nSomething";
    let appended = apply_rules_to_template(without_heading, &found, &rules);
    assert_eq!(
        appended,
        "## Summary\nSomething\n\nRelated Tickets\n- JIRA-100\n- JIRA-200"
    );
}

#[test]
fn test_reapplying_rules_is_stable() {
    let rules = ticket_rules();
    let mut found = ExtractedInfo::new();
    found.insert(TICKETS.to_string(), vec!["JIRA-100".into()]);

    let once = apply_rules_to_template(TEMPLATE, &found, &rules);
    let twice = apply_rules_to_template(&once, &found, &rules);
    assert_eq!(once, twice);
}
