use std::net::{Ipv4Addr, SocketAddr};

use clap::Args;

pub const DEFAULT_RPC_PORT: u16 = 9944;

/// Parameters of the JSON-RPC server.
#[derive(Debug, Clone, Args)]
pub struct RpcParams {
    /// Port of the JSON-RPC server.
    #[arg(env = "RWA_ENGINE_RPC_PORT", long, default_value_t = DEFAULT_RPC_PORT)]
    pub rpc_port: u16,

    /// Listen on all interfaces instead of localhost only.
    #[arg(env = "RWA_ENGINE_RPC_EXTERNAL", long, default_value_t = false)]
    pub rpc_external: bool,

    #[arg(env = "RWA_ENGINE_RPC_MAX_CONNECTIONS", long, default_value_t = 100)]
    pub rpc_max_connections: u32,

    /// Maximum request body size, in megabytes.
    #[arg(env = "RWA_ENGINE_RPC_MAX_REQUEST_SIZE", long, default_value_t = 15)]
    pub rpc_max_request_size: u32,

    /// Maximum response body size, in megabytes.
    #[arg(env = "RWA_ENGINE_RPC_MAX_RESPONSE_SIZE", long, default_value_t = 15)]
    pub rpc_max_response_size: u32,

    /// Origins allowed by CORS. `*` allows any origin. Unset disables CORS.
    #[arg(env = "RWA_ENGINE_RPC_CORS", long, value_delimiter = ',')]
    pub rpc_cors: Option<Vec<String>>,
}

/// Which origins the server answers cross-origin requests for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cors {
    All,
    List(Vec<String>),
}

impl RpcParams {
    pub fn addr(&self) -> SocketAddr {
        let ip = if self.rpc_external {
            Ipv4Addr::UNSPECIFIED
        } else {
            Ipv4Addr::LOCALHOST
        };
        SocketAddr::new(ip.into(), self.rpc_port)
    }

    pub fn cors(&self) -> Option<Cors> {
        let origins = self.rpc_cors.as_ref()?;
        if origins.iter().any(|o| o == "*") {
            return Some(Cors::All);
        }
        Some(Cors::List(origins.clone()))
    }
}
