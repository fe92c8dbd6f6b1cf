//! vkg-publish - build or publish the vkg package
//!
//! CONAN_NEED_BUILD selects the path; see `PublishConfig` for the rest.
//! Returns non-zero when the package tool fails.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use vkg_release::{
    logging::init_logging, BuildMode, CiEnvironment, ConanCli, Orchestrator, PublishConfig,
    PublishOutcome, Recipe,
};

#[derive(Parser)]
#[command(name = "vkg-publish")]
#[command(about = "Build the package matrix or export and upload the recipe", version)]
struct Cli {
    /// Recipe descriptor
    #[arg(short, long, default_value = "recipe.json")]
    recipe: PathBuf,

    /// Print the decided mode and reference, invoke nothing
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match PublishConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let recipe = match Recipe::load(&cli.recipe) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let recipe_dir = cli
        .recipe
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);

    let tool = ConanCli::new(&config.tool_program);
    let mode = config.mode;
    let mut orchestrator =
        Orchestrator::new(config, recipe, tool, CiEnvironment::from_env()).with_recipe_dir(recipe_dir);

    if cli.dry_run {
        match mode {
            BuildMode::Build => println!(
                "build {} ({} configurations)",
                orchestrator.reference(),
                orchestrator.build_matrix().len()
            ),
            BuildMode::PublishOnly => println!("publish {}", orchestrator.reference()),
        }
        return ExitCode::SUCCESS;
    }

    match orchestrator.run() {
        Ok(PublishOutcome::Built { configurations }) => {
            println!("Built {} in {} configuration(s)", orchestrator.reference(), configurations);
            ExitCode::SUCCESS
        }
        Ok(PublishOutcome::Published { reference, remote }) => {
            println!("Uploaded {reference} to {remote}");
            ExitCode::SUCCESS
        }
        Ok(PublishOutcome::Exported { reference, upload_skipped }) => {
            println!("Exported {reference}; upload skipped: {upload_skipped}");
            ExitCode::SUCCESS
        }
        Ok(PublishOutcome::Skipped(reason)) => {
            println!("Nothing to do: {reason}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
