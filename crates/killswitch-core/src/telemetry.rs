//! Tracing initialisation for the `killswitch` binary and test harnesses.
//!
//! Log lines go to stderr so `--format json` output on stdout stays parseable.
//! Filtering is taken from `KILLSWITCH_LOG`, then `RUST_LOG`, and otherwise
//! scoped to the Kill Switch crates at the requested level with every other
//! crate (reqwest, hyper, rustls) held at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "KILLSWITCH_LOG";

const CRATE_TARGETS: [&str; 4] = [
    "killswitch",
    "killswitch_core",
    "killswitch_providers",
    "killswitch_pipeline",
];

/// Default filter directives: `warn` globally, `level` for our own crates.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(CRATE_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Initialise the global tracing subscriber. Later calls are ignored.
///
/// With `json`, each line carries the enclosing session span so records can be
/// grouped by `session_id`.
pub fn init_tracing(json: bool, level: Level) {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
