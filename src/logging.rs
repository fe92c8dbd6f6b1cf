//! Logging setup shared by the release binaries.

use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Library plus both binary targets; the binaries report failures themselves.
const DEFAULT_LOG_FILTER: &str = "vkg_release=info,vkg_publish=info,vkg_symlink=info";
const VERBOSE_LOG_FILTER: &str = "vkg_release=debug,vkg_publish=debug,vkg_symlink=debug";

/// Install a stderr subscriber. `RUST_LOG` wins over `verbose`.
///
/// Stdout stays reserved for the lines CI scripts read.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
