use std::time::Duration;

use schemars::JsonSchema;
use serde::Deserialize;
use stars_api::{ApiError, StarsApiConfig, UrlValidationConfig};
use stars_mcp_server::server::Transport;
use stars_mcp_server::server_info::ServerInfoConfig;

use super::logging::Logging;

/// Configuration for the MCP server
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Connection to the GitHub Stars GraphQL API
    pub stars_api: StarsApiConfig,

    /// Reachability checks for URLs submitted in contributions and links
    pub url_validation: UrlValidationConfig,

    /// Checks performed before serving
    pub startup: Startup,

    /// Start even without an API token. Only public reads will work.
    pub dangerously_omit_auth: bool,

    /// The type of server transport to use
    pub transport: Transport,

    /// Metadata reported to MCP clients
    pub server_info: ServerInfoConfig,

    /// Logging configuration
    pub logging: Logging,
}

impl Config {
    /// A token is required unless explicitly waived
    pub fn check_credentials(&self) -> Result<(), ApiError> {
        if self.stars_api.token.is_none() && !self.dangerously_omit_auth {
            return Err(ApiError::MissingCredential);
        }
        Ok(())
    }
}

/// Checks performed before serving
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Startup {
    /// Ask the API whether the token belongs to a logged in user. A rejected token stops startup;
    /// a check that runs out of time is only logged.
    pub verify_token: bool,

    /// How long the token check may take
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub verify_timeout: Duration,
}

impl Default for Startup {
    fn default() -> Self {
        Self {
            verify_token: true,
            verify_timeout: Duration::from_secs(2),
        }
    }
}
