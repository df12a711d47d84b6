//! End-to-end drafting runs over real repositories and project files.

mod common;

use common::{TestRepo, write_file};
use prdraft::github::EventContext;
use prdraft::{ActionOutputs, Pipeline, ProjectPaths, RepoChanges, RunOutcome};

const RULES: &str = r###"{
  "rules": [
    { "pattern": "JIRA-\\d+", "targetSection": "Related Tickets" },
    { "pattern": "BREAKING", "targetSection": "Breaking Changes" },
    { "pattern": "perf:.*", "targetSection": "## Performance" }
  ],
  "templateSelection": {
    "rules": [
      { "condition": "branch", "pattern": "^docs/", "template": "docs", "priority": 1 },
      { "condition": "commit", "pattern": "JIRA", "template": "ticket" }
    ],
    "defaultTemplate": "feature"
  }
}"###;

const TICKET_TEMPLATE: &str = "## Summary\n<!-- AI will fill this automatically -->\n\n## Related Tickets\n-\n\n## Breaking Changes\n-\n";

fn project() -> TestRepo {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# demo\n", "chore: initial commit");
    repo.checkout_new_branch("feature/JIRA-100-login");
    repo.commit_file("src/login.rs", "fn login() {}\n", "feat: add login form");
    repo.commit_file("src/auth.rs", "fn auth() {}\n", "JIRA-200 wire up auth\n\nperf: cache sessions");

    write_file(repo.path(), ".github/ai-pr/rules.json", RULES);
    write_file(repo.path(), ".github/ai-pr/templates/ticket.md", TICKET_TEMPLATE);
    repo
}

fn pipeline(repo: &TestRepo, paths: &ProjectPaths) -> Pipeline {
    let source = RepoChanges::new(repo.path(), EventContext::default(), "main");
    Pipeline::from_paths(Box::new(source), paths)
        .with_outputs(ActionOutputs::to_file(repo.path().join("github_output")))
        .with_output_path(repo.path().join("pr-template-output.md"))
}

#[tokio::test]
async fn test_rules_only_run_writes_injected_template() {
    let repo = project();
    let paths = ProjectPaths::resolve(repo.path(), None);

    let outcome = pipeline(&repo, &paths).run().await.unwrap();

    let expected = "## Summary\n<!-- AI will fill this automatically -->\n\n\
                    ## Related Tickets\n- JIRA-200\n- JIRA-100\n\n\
                    ## Breaking Changes\nN/A\n\n\n\
                    ## Performance\n- perf: cache sessions";

    let written = std::fs::read_to_string(repo.path().join("pr-template-output.md")).unwrap();
    assert_eq!(written, expected);
    assert!(matches!(
        outcome,
        RunOutcome::Drafted { ref template, ai_generated: false, .. } if template == "ticket"
    ));

    let outputs = std::fs::read_to_string(repo.path().join("github_output")).unwrap();
    assert_eq!(
        outputs,
        "template-used=ticket\nshould-update-body=false\ncontent-generated=true\n"
    );
}

#[tokio::test]
async fn test_builtin_template_when_no_file_exists() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# demo\n", "chore: initial commit");
    repo.checkout_new_branch("hotfix-123");
    repo.commit_file("src/fix.rs", "fn fix() {}\n", "patch crash");

    let paths = ProjectPaths::resolve(repo.path(), None);
    let outcome = pipeline(&repo, &paths).run().await.unwrap();

    let RunOutcome::Drafted { template, content, .. } = outcome else {
        panic!("expected a drafted outcome");
    };
    assert_eq!(template, "hotfix");
    assert!(!content.is_empty());
}

#[tokio::test]
async fn test_legacy_paths_are_used() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# demo\n", "chore: initial commit");
    repo.commit_file("src/a.rs", "fn a() {}\n", "add a");
    write_file(
        repo.path(),
        ".github/pr-rules.json",
        r#"{ "templateSelection": { "rules": [], "defaultTemplate": "custom" } }"#,
    );
    write_file(repo.path(), ".github/pull_request_templates/custom.md", "## Legacy\n");

    let paths = ProjectPaths::resolve(repo.path(), None);
    assert!(paths.template_dir.ends_with(".github/pull_request_templates"));

    let RunOutcome::Drafted { template, content, .. } = pipeline(&repo, &paths).run().await.unwrap()
    else {
        panic!("expected a drafted outcome");
    };
    assert_eq!(template, "custom");
    assert_eq!(content, "## Legacy\n");
}

#[tokio::test]
async fn test_malformed_rules_file_falls_back_to_defaults() {
    let repo = project();
    write_file(repo.path(), ".github/ai-pr/rules.json", "{ not json");

    let paths = ProjectPaths::resolve(repo.path(), None);
    let RunOutcome::Drafted { template, .. } = pipeline(&repo, &paths).run().await.unwrap() else {
        panic!("expected a drafted outcome");
    };
    assert_eq!(template, "feature");
}

#[tokio::test]
async fn test_no_changes_writes_nothing() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "# demo\n", "chore: initial commit");

    let paths = ProjectPaths::resolve(repo.path(), None);
    let outcome = pipeline(&repo, &paths).run().await.unwrap();

    assert_eq!(outcome, RunOutcome::NoChanges);
    assert!(!repo.path().join("pr-template-output.md").exists());
    assert_eq!(
        std::fs::read_to_string(repo.path().join("github_output")).unwrap(),
        "content-generated=false\n"
    );
}
