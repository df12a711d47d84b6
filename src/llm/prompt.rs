//! Prompt construction for filling PR templates.

/// Marker in templates for content the model should write.
pub const AI_PLACEHOLDER: &str = "<!-- AI will fill this automatically -->";

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that analyzes Git diffs and fills out Pull Request templates automatically.

**Writing Guidelines:**
- Write in clear, concise English
- Keep markdown structure intact
- Replace only `<!-- AI will fill this automatically -->` placeholders
- Leave empty sections as-is if no relevant information is found
- Focus on what changed, why it matters, and what reviewers should know

**Writing Style:**
- Be direct and technical
- Use bullet points for lists
- Highlight important changes or potential impacts
- Suggest specific areas for reviewer attention"#;

/// Maximum characters of diff text sent to the model.
const MAX_DIFF_LENGTH: usize = 60_000;

/// Build the user instruction: changed files, the diff, and the template to fill.
pub fn build_user_prompt(diff: &str, changed_files: &[String], template: &str) -> String {
    let (diff, truncated) = truncate_diff(diff, MAX_DIFF_LENGTH);
    let truncation_note = if truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    format!(
        r#"Analyze the following Git diff and changed file list, then fill in each `{placeholder}` section of the PR template according to the system prompt guidelines.

**Changed files:**
```
{files}
```

**Git diff:**
```diff
{diff}
```{truncation_note}

**PR template (fill in the placeholders of this template):**
{template}
"#,
        placeholder = AI_PLACEHOLDER,
        files = changed_files.join("\n"),
    )
}

/// Cut `diff` to at most `max` bytes on a char boundary.
fn truncate_diff(diff: &str, max: usize) -> (&str, bool) {
    if diff.len() <= max {
        return (diff, false);
    }

    let mut end = max;
    while !diff.is_char_boundary(end) {
        end -= 1;
    }
    (&diff[..end], true)
}
