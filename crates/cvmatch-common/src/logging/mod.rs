//! Unified logging initialization for CV-Match client binaries and tests
//!
//! Respects `RUST_LOG` when set and falls back to the caller-provided
//! default filter otherwise.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the given default filter.
///
/// # Example
///
/// ```no_run
/// cvmatch_common::logging::init_logging("cvmatch_client=info").unwrap();
/// ```
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true) // Show module path
                .compact(), // Use compact format
        )
        .try_init()
        .ok(); // Repeated initialization (e.g. across tests) is not an error

    Ok(())
}
