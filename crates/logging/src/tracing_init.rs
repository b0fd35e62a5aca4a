//! crates/logging/src/tracing_init.rs
//! Subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::config::VerbosityConfig;

/// Installs the global formatter subscriber.
///
/// When `RUST_LOG` is set and the configuration respects the environment, its
/// directives replace the ones derived from the verbosity level. Returns
/// `false` when a global subscriber was already installed, which leaves the
/// existing one in place.
pub fn init_tracing(config: &VerbosityConfig) -> bool {
    let filter = build_filter(config);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn build_filter(config: &VerbosityConfig) -> EnvFilter {
    if config.respect_env
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(config.directives())
}
