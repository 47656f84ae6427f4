//! Tracing setup for the CLI

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing to stderr.
///
/// Safe to call more than once. Output is enabled only when `RUST_LOG` is
/// set, e.g. `RUST_LOG=psan_suite_config=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
