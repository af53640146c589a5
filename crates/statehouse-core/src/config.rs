//! Store configuration from code or environment variables.

use std::env;

/// Which set of runtime checks is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Diagnostics recorded and logged, strict mode honoured, local type
    /// existence checked.
    Development,
    /// All of the above silenced.
    Production,
}

impl BuildMode {
    /// `Development` under `debug_assertions`, `Production` otherwise.
    #[must_use]
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }

    #[must_use]
    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Behaviour switches for one store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Install the strict-mode checker.
    pub strict: bool,

    /// Development or production checks.
    pub mode: BuildMode,

    /// How many diagnostics are kept in memory.
    pub diagnostic_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            strict: false,
            mode: BuildMode::default(),
            diagnostic_capacity: 256,
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STATEHOUSE_STRICT`: Enable strict mode (default: false)
    /// - `STATEHOUSE_MODE`: `development` or `production` (default: from build profile)
    /// - `STATEHOUSE_DIAGNOSTIC_CAPACITY`: Diagnostics kept in memory (default: 256)
    pub fn from_env() -> Self {
        Self {
            strict: env::var("STATEHOUSE_STRICT")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            mode: env::var("STATEHOUSE_MODE")
                .ok()
                .and_then(|v| match v.to_lowercase().as_str() {
                    "development" | "dev" => Some(BuildMode::Development),
                    "production" | "prod" => Some(BuildMode::Production),
                    _ => None,
                })
                .unwrap_or_default(),

            diagnostic_capacity: env::var("STATEHOUSE_DIAGNOSTIC_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        }
    }

    /// Development config with strict mode on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            mode: BuildMode::Development,
            ..Self::default()
        }
    }

    /// Whether the strict-mode checker should be installed.
    #[must_use]
    pub fn strict_checks(&self) -> bool {
        self.strict && !self.mode.is_production()
    }
}
