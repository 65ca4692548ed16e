//! Logging and tracing configuration
//!
//! The library only emits `tracing` events. Binaries and test suites pick
//! a subscriber here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stdio_script=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing for a test binary
///
/// Output goes through the test harness capture so it only shows for
/// failing tests. Safe to call from every test; only the first call
/// installs the subscriber. Set `RUST_LOG=stdio_script::io=trace` together
/// with `write_log` to see every character the program exchanged.
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stdio_script=debug"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_ansi(false),
        )
        .try_init();
}
