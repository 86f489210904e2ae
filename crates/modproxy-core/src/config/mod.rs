//! Proxy configuration schema.
//!
//! Deserialized via the `config` crate from an optional TOML file merged
//! with environment variables prefixed with `MODPROXY__`. Every field has a
//! default, so an empty source set yields a usable configuration.

pub mod loader;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::loader::LoaderConfig;
pub use self::logging::LoggingConfig;

use crate::error::ProxyError;

/// Root proxy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Candidate recognition and binding settings.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProxyConfig {
    /// Load configuration from an optional file plus the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ProxyError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), exists = path.is_file(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("MODPROXY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ProxyError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| ProxyError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
