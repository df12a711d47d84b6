//! prdraft - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use prdraft::git::LocalGit;
use prdraft::github::EventContext;
use prdraft::outputs::CONTENT_GENERATED;
use prdraft::pipeline::DEFAULT_OUTPUT_PATH;
use prdraft::{ActionOutputs, Config, HttpGenerator, Pipeline, ProjectPaths, RepoChanges};

/// Draft a pull request description from the current changes.
#[derive(Parser, Debug)]
#[command(name = "prdraft")]
#[command(about = "Draft a pull request description from the current changes")]
#[command(version)]
struct Cli {
    /// Repository root to read templates, rules and git history from
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Path to the generated description
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Dry run - print the description without writing
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outputs = ActionOutputs::from_env();

    if let Err(e) = run(&cli, outputs.clone()).await {
        error!("Failed to draft PR description: {:#}", e);
        if let Err(output_err) = outputs.set_bool(CONTENT_GENERATED, false) {
            warn!("{}", output_err);
        }
        return Err(e);
    }

    Ok(())
}

async fn run(cli: &Cli, outputs: ActionOutputs) -> Result<()> {
    // Step 1: Check prerequisites
    LocalGit::check_installed().context("git is required")?;

    // Step 2: Load configuration and event context
    let config = Config::from_env();
    let paths = ProjectPaths::resolve(&cli.workdir, config.template_path.as_deref());
    let event = EventContext::from_env();
    let should_update_body = event.should_update_body(config.update_mode);

    // Step 3: Wire up sources and the generator
    let source = RepoChanges::new(&cli.workdir, event, config.main_branch.clone())
        .with_github_if_available();

    let mut pipeline = Pipeline::from_paths(Box::new(source), &paths)
        .with_outputs(outputs)
        .with_output_path(&cli.output)
        .dry_run(cli.dry_run)
        .should_update_body(should_update_body);

    match &config.api_key {
        Some(api_key) => {
            let generator = HttpGenerator::from_config(&config, api_key)
                .context("Failed to set up AI provider")?;
            println!(
                "Using AI provider {} ({})",
                generator.provider_name(),
                generator.model()
            );
            pipeline = pipeline.with_generator(Box::new(generator));
        }
        None => println!("No API key found. Using basic template."),
    }

    // Step 4: Draft
    pipeline.run().await.context("Pipeline run failed")?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
