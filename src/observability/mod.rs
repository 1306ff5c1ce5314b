//! Logging setup.
//!
//! The library only emits `tracing` events and spans; nothing is printed
//! unless the embedding program installs a subscriber. [`init_logging`] is
//! the stock one: a compact `fmt` subscriber on stderr whose filter comes
//! from the verbosity level or, when set, the `TESTLENS_LOG` variable.
//!
//! ```rust,no_run
//! testlens::observability::init_logging(1);
//! tracing::info!("analysis started");
//! ```

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `testlens=debug`.
pub const LOG_ENV: &str = "TESTLENS_LOG";

static INIT: Once = Once::new();

/// Filter directive for a verbosity level: 0 warnings, 1 info, 2 debug,
/// 3 and above trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "testlens=warn",
        1 => "testlens=info",
        2 => "testlens=debug",
        _ => "testlens=trace",
    }
}

/// Install the global subscriber. Later calls are no-ops, and a subscriber
/// already installed by the host program is left in place.
pub fn init_logging(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        let result = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init();

        if result.is_err() {
            tracing::debug!("global subscriber already set; keeping it");
        }
    });
}
