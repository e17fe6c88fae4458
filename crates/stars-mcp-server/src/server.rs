use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use bon::bon;
use schemars::JsonSchema;
use serde::Deserialize;
use stars_api::StarsAdapter;

use crate::errors::ServerError;
use crate::server_info::ServerInfoConfig;
use crate::tools::ToolRegistry;

mod states;

use states::StateMachine;

/// A GitHub Stars MCP Server
pub struct Server {
    transport: Transport,
    adapter: Arc<StarsAdapter>,
    registry: ToolRegistry,
    server_info: ServerInfoConfig,
}

#[derive(Debug, Clone, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// Use standard IO for server <> client communication
    #[default]
    Stdio,

    /// Host the MCP server on the configuration, using streamable HTTP messages.
    StreamableHttp {
        /// The IP address to bind to
        #[serde(default = "Transport::default_address")]
        address: IpAddr,

        /// The port to bind to
        #[serde(default = "Transport::default_port")]
        port: u16,

        /// Enable stateful mode for session management
        #[serde(default = "Transport::default_stateful_mode")]
        stateful_mode: bool,
    },
}

impl Transport {
    fn default_address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn default_port() -> u16 {
        8766
    }

    fn default_stateful_mode() -> bool {
        true
    }

    /// Whether stdout belongs to the MCP protocol
    pub fn uses_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        transport: Transport,
        adapter: Arc<StarsAdapter>,
        #[builder(default = ToolRegistry::stars())] registry: ToolRegistry,
        #[builder(default)] server_info: ServerInfoConfig,
    ) -> Self {
        Self {
            transport,
            adapter,
            registry,
            server_info,
        }
    }

    /// Serve until the client disconnects (stdio) or the process is asked to stop (HTTP)
    pub async fn start(self) -> Result<(), ServerError> {
        StateMachine {}.start(self).await
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::stdio("type: stdio", Transport::Stdio)]
    #[case::http_defaults(
        "type: streamable_http",
        Transport::StreamableHttp {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8766,
            stateful_mode: true,
        }
    )]
    #[case::http_custom(
        "type: streamable_http\naddress: 0.0.0.0\nport: 9000\nstateful_mode: false",
        Transport::StreamableHttp {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 9000,
            stateful_mode: false,
        }
    )]
    fn transport_from_yaml(#[case] yaml: &str, #[case] expected: Transport) {
        let transport: Transport = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(transport, expected);
    }

    #[test]
    fn sse_is_not_a_transport() {
        assert!(serde_yaml::from_str::<Transport>("type: sse").is_err());
    }
}
