//! vkg-symlink - alias the assets directory next to the binaries
//!
//! Usage: vkg-symlink <ASSETS_DIR> <BIN_ASSETS_DIR>
//!
//! Failures are printed and exit 0 unless --strict is given.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

use vkg_release::{install, logging::init_logging, platform_alias, LinkOutcome, LinkSpec};

#[derive(Parser)]
#[command(name = "vkg-symlink")]
#[command(about = "Link the assets directory into the binary output directory", version)]
struct Cli {
    /// Directory holding the runtime assets
    assets_dir: PathBuf,

    /// Alias to create, usually <bin>/assets
    bin_assets_dir: PathBuf,

    /// Exit non-zero when the alias cannot be created
    #[arg(long)]
    strict: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let alias = platform_alias();
    let result = LinkSpec::new(&cli.assets_dir, &cli.bin_assets_dir)
        .map_err(|e| e.to_string())
        .and_then(|spec| install(&spec, alias.as_ref()).map_err(|e| e.to_string()));

    match result {
        Ok(LinkOutcome::Created) => {
            println!(
                "Created Symlink {} -> {}",
                cli.bin_assets_dir.display(),
                cli.assets_dir.display()
            );
            ExitCode::SUCCESS
        }
        Ok(LinkOutcome::AlreadyExists) => {
            println!("Symlink already exists: {}", cli.bin_assets_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let args: Vec<String> = std::env::args().collect();
            println!("{args:?}\n{e}");
            warn!("asset link was not created");
            if cli.strict {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
