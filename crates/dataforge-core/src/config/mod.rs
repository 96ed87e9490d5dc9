//! Access-layer configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod paging;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::paging::PagingConfig;

use crate::error::DataError;

/// Root access-layer configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataAccessConfig {
    /// Pagination defaults and limits.
    #[serde(default)]
    pub paging: PagingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DataAccessConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DATAFORGE_`.
    pub fn load(env: &str) -> Result<Self, DataError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DATAFORGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DataError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| DataError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
