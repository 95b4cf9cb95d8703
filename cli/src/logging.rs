//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Events go to stderr so stdout carries only the interpretation. Patient values are
//! only logged at `debug` and below.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 0 → info, 1 (`-v`) → debug, 2+ (`-vv`) → trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, overrides the verbosity flag.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::INFO);
        assert_eq!(level_from_verbosity(1), LevelFilter::DEBUG);
        assert_eq!(level_from_verbosity(5), LevelFilter::TRACE);
    }
}
