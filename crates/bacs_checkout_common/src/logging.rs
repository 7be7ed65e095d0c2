//! Logging setup shared by the service binaries and tests.
//!
//! All crates log through `tracing`. The subscriber installed here prints
//! target, file and line for every event; `RUST_LOG` takes precedence over
//! the level passed in.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate targets that follow the level given to [`init_with_level`].
const SERVICE_TARGETS: &[&str] = &[
    "bacs_checkout_backend",
    "bacs_checkout_stripe",
    "bacs_checkout_config",
    "bacs_checkout_common",
];

/// Initialize the tracing subscriber at INFO.
///
/// ```
/// use bacs_checkout_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG); // no-op, already installed
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Calling it more than once is harmless; the first subscriber stays.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

fn default_filter(level: Level) -> EnvFilter {
    let mut directives: Vec<String> = SERVICE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.push("tower_http=info".to_string());
    directives.push("warn".to_string());
    EnvFilter::new(directives.join(","))
}
