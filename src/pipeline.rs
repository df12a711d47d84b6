//! One drafting run: changes in, PR description out.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::{ProjectPaths, load_rules, load_system_prompt};
use crate::error::PipelineError;
use crate::llm::{ContentGenerator, DEFAULT_SYSTEM_PROMPT, build_user_prompt, generate_content};
use crate::outputs::{ActionOutputs, CONTENT_GENERATED, SHOULD_UPDATE_BODY, TEMPLATE_USED};
use crate::rules::RulesFile;
use crate::source::ChangeSource;
use crate::template::{
    TemplateSelector, TemplateStore, apply_rules_to_template, extract_info_by_rules,
    merge_generated_content,
};

/// Where the finished description is written unless overridden.
pub const DEFAULT_OUTPUT_PATH: &str = "pr-template-output.md";

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No diff and no changed files; nothing was written.
    NoChanges,
    Drafted {
        template: String,
        /// Whether the generator contributed text.
        ai_generated: bool,
        should_update_body: bool,
        content: String,
    },
}

pub struct Pipeline {
    source: Box<dyn ChangeSource>,
    generator: Option<Box<dyn ContentGenerator>>,
    store: TemplateStore,
    rules: RulesFile,
    system_prompt: String,
    outputs: ActionOutputs,
    output_path: PathBuf,
    dry_run: bool,
    should_update_body: bool,
}

impl Pipeline {
    pub fn new(source: Box<dyn ChangeSource>, store: TemplateStore, rules: RulesFile) -> Self {
        Self {
            source,
            generator: None,
            store,
            rules,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            outputs: ActionOutputs::stdout(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dry_run: false,
            should_update_body: false,
        }
    }

    /// Build a pipeline from the project's template directory, rules file and
    /// system prompt.
    pub fn from_paths(source: Box<dyn ChangeSource>, paths: &ProjectPaths) -> Self {
        debug!("Project paths: {:?}", paths);
        let mut pipeline = Self::new(
            source,
            TemplateStore::new(&paths.template_dir),
            load_rules(&paths.rules_path),
        );
        pipeline.system_prompt = load_system_prompt(&paths.system_prompt_path);
        pipeline
    }

    /// Without a generator the run fills the template from rules only.
    pub fn with_generator(mut self, generator: Box<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_outputs(mut self, outputs: ActionOutputs) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Print the result instead of writing the output file.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn should_update_body(mut self, update: bool) -> Self {
        self.should_update_body = update;
        self
    }

    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        // Step 1: Collect changes
        let diff = self.source.diff().await;
        if diff.is_empty() {
            println!("No changes detected. Nothing to draft.");
            self.outputs.set_bool(CONTENT_GENERATED, false)?;
            return Ok(RunOutcome::NoChanges);
        }
        info!(
            "Diff is {} bytes across {} files",
            diff.diff.len(),
            diff.changed_files.len()
        );

        // Step 2: Select and read the template
        let branch = self.source.branch_name();
        let title = self.source.pr_title();
        let last_commit = self.source.last_commit_message()?;

        let selector = TemplateSelector::new(self.rules.template_selection.clone());
        let template_id = selector.select_template(&title, &branch, &last_commit);
        println!("Using template: {}", template_id);
        self.outputs.set(TEMPLATE_USED, &template_id)?;

        let template = self.store.read_template(&template_id);

        // Step 3: Generate content
        let generated = match &self.generator {
            Some(generator) => {
                println!("Generating PR description...");
                let user_prompt = build_user_prompt(&diff.diff, &diff.changed_files, &template);
                generate_content(generator.as_ref(), &self.system_prompt, &user_prompt).await
            }
            None => {
                info!("No API key configured, filling template from rules only");
                None
            }
        };
        let ai_generated = generated.is_some();
        let content = merge_generated_content(generated.as_deref(), &template);

        // Step 4: Inject rule-extracted details
        let commit_messages = self.source.commit_messages().await.unwrap_or_else(|e| {
            warn!("Failed to read commit messages: {}", e);
            String::new()
        });
        let extracted = extract_info_by_rules(&commit_messages, &branch, &self.rules.rules);
        debug!("Extracted {} rule buckets", extracted.len());
        let content = apply_rules_to_template(&content, &extracted, &self.rules.rules);

        // Step 5: Write
        self.outputs.set_bool(SHOULD_UPDATE_BODY, self.should_update_body)?;

        if self.dry_run {
            println!("\n--- Dry Run Output ---\n");
            println!("{}", content);
        } else {
            write_atomic(&self.output_path, &content)?;
            println!("✓ Wrote {}", self.output_path.display());
        }

        self.outputs.set_bool(CONTENT_GENERATED, true)?;

        Ok(RunOutcome::Drafted {
            template: template_id,
            ai_generated,
            should_update_body: self.should_update_body,
            content,
        })
    }
}

/// Write through a temporary file in the target directory, then rename.
fn write_atomic(path: &Path, content: &str) -> Result<(), PipelineError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write = || -> std::io::Result<()> {
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    };

    write().map_err(|source| PipelineError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
