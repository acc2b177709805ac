//! Tracing bootstrap shared by the booklist binaries.
//!
//! Logs always go to stderr so stdout stays free for the list itself.

use booklist_kernel::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the level filter: `RUST_LOG` when set, the configured level otherwise.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level).map_err(|e| {
            anyhow::anyhow!("invalid log level '{}': {}", settings.log_level, e)
        }),
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed; that is not an error.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<bool> {
    let filter = env_filter(settings)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "booklist-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(installed)
}
