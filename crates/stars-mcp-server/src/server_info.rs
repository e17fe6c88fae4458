use rmcp::model::Implementation;
use schemars::JsonSchema;
use serde::Deserialize;

const DEFAULT_NAME: &str = "GitHub Stars MCP Server";

/// Server metadata configuration
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerInfoConfig {
    /// The name of the MCP server implementation
    pub name: Option<String>,

    /// The version of the MCP server implementation
    pub version: Option<String>,

    /// Human-readable title for the server
    pub title: Option<String>,

    /// URL to the server's website or documentation
    pub website_url: Option<String>,
}

impl ServerInfoConfig {
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| DEFAULT_NAME.to_string())
    }

    pub fn version(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }

    pub fn title(&self) -> Option<String> {
        self.title.clone().or_else(|| Some(DEFAULT_NAME.to_string()))
    }

    pub fn website_url(&self) -> Option<String> {
        self.website_url
            .clone()
            .or_else(|| Some("https://stars.github.com".to_string()))
    }

    pub(crate) fn implementation(&self) -> Implementation {
        Implementation {
            name: self.name(),
            description: None,
            icons: None,
            title: self.title(),
            version: self.version(),
            website_url: self.website_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_this_server() {
        let implementation = ServerInfoConfig::default().implementation();

        assert_eq!(implementation.name, "GitHub Stars MCP Server");
        assert_eq!(implementation.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(implementation.website_url.as_deref(), Some("https://stars.github.com"));
    }

    #[test]
    fn configured_values_win() {
        let config: ServerInfoConfig = serde_json::from_value(serde_json::json!({
            "name": "stars-internal",
            "title": "Stars (staging)",
        }))
        .unwrap();

        assert_eq!(config.name(), "stars-internal");
        assert_eq!(config.title().as_deref(), Some("Stars (staging)"));
    }
}
