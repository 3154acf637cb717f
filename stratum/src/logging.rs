//! Diagnostic tracing for the `stratum` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the embedding process. The CLI installs this one.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: resolver warnings only.
const DEFAULT_FILTER: &str = "stratum=warn";

/// Install the CLI subscriber: `RUST_LOG` filter, compact events on stderr.
///
/// Stdout stays reserved for command output, so resolution traces never mix
/// with printed origins.
///
/// ```bash
/// RUST_LOG=stratum::resolver=debug stratum resolve com.acme.Job
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();
}
