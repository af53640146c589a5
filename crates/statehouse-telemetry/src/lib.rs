//! # Statehouse Telemetry
//!
//! Logging bootstrap for binaries built on statehouse. Libraries in the
//! workspace only emit `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use statehouse_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STATEHOUSE_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `STATEHOUSE_JSON_LOGS` | `false` | JSON instead of pretty output |
//! | `STATEHOUSE_SERVICE_NAME` | `statehouse` | Service name in the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}
