use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::ProvisionerError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
pub fn try_init_logging(format: LogFormat) -> Result<(), ProvisionerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| ProvisionerError::Logging(e.to_string()))
}

/// Like [`try_init_logging`], but a host that already installed a
/// subscriber is not an error.
pub fn init_logging(format: LogFormat) {
    if let Err(e) = try_init_logging(format) {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
