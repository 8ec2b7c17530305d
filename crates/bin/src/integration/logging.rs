//! Logging setup.
//!
//! Noisy HTTP and TLS modules are held at `warn` unless `RUST_LOG` says
//! otherwise. Logs go to stderr so that stdout stays clean for results.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Modules filtered to `warn` by default.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

/// Base level for a `-v` count.
pub(crate) const fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(log_level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }

    EnvFilter::new(&directives)
}

/// Initialize logging; `json` selects structured output.
pub(crate) fn init_logging(verbosity: u8, json: bool) {
    let log_level = level_for(verbosity);
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(%log_level, json, "Logging initialized");
}
