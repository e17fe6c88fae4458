//! Runtime utilities
//!
//! This module is only used by the main binary and provides helper code
//! related to runtime configuration.

mod config;
pub mod logging;

use std::path::Path;

pub use config::Config;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

/// Separator to use when drilling down into nested options in the env figment
const ENV_NESTED_SEPARATOR: &str = "__";

/// Prefix of environment variables overriding any config option
const ENV_PREFIX: &str = "STARS_MCP_";

/// Read configuration from environment variables only (when no config file is provided)
#[allow(clippy::result_large_err)]
pub fn read_config_from_env() -> Result<Config, figment::Error> {
    Figment::new()
        .join(stars_common_env())
        .join(Env::prefixed(ENV_PREFIX).split(ENV_NESTED_SEPARATOR))
        .extract()
}

/// Read in a config from a YAML file, filling in any missing values from the environment.
#[allow(clippy::result_large_err)]
pub fn read_config(yaml_path: impl AsRef<Path>) -> Result<Config, figment::Error> {
    let content = std::fs::read_to_string(yaml_path.as_ref()).map_err(|e| {
        figment::Error::from(format!(
            "failed to read config file '{}': {}",
            yaml_path.as_ref().display(),
            e
        ))
    })?;

    Figment::new()
        .join(stars_common_env())
        .join(Env::prefixed(ENV_PREFIX).split(ENV_NESTED_SEPARATOR))
        .join(Yaml::string(&content))
        .extract()
}

/// Figment provider that maps the well-known `STARS_API_TOKEN` variable into
/// the nested structure needed by the config
fn stars_common_env() -> Env {
    Env::prefixed("STARS_")
        .only(&["api_token"])
        .map(|key| match key.to_string().to_lowercase().as_str() {
            "api_token" => "STARS_API:TOKEN".into(),

            // This case should never happen, so we just pass through this case as is
            other => other.to_string().into(),
        })
        .split(":")
}
