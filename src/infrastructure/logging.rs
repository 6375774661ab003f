//! Diagnostic logging
//!
//! tracing output goes to stderr so stdout stays reserved for results
//! (and NDJSON under `--json`). `RUST_LOG` wins over `-v` when set.

use tracing_subscriber::EnvFilter;

/// Default level for a `-v` count
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={}", level_for(verbose))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
