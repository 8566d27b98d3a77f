use std::net::SocketAddr;

use anyhow::Context;
use hyper::{
    header::{self, HeaderValue},
    Method,
};
use jsonrpsee::{
    server::{Server, ServerHandle},
    Methods,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::cli::rpc::Cors;

const MEGABYTE: u32 = 1024 * 1024;

pub struct ServerConfig {
    pub name: String,
    pub addr: SocketAddr,
    pub max_connections: u32,
    pub max_payload_in_mb: u32,
    pub max_payload_out_mb: u32,
    pub methods: Methods,
    pub cors: Option<Cors>,
}

fn cors_layer(cors: Option<Cors>) -> anyhow::Result<Option<CorsLayer>> {
    let Some(cors) = cors else {
        return Ok(None);
    };
    let origin = match cors {
        Cors::All => AllowOrigin::any(),
        Cors::List(origins) => {
            let origins = origins
                .iter()
                .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin {}", o)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(origins)
        }
    };
    Ok(Some(
        CorsLayer::new()
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(origin),
    ))
}

/// Bind the server and start serving. Returns once the socket is listening.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<(ServerHandle, SocketAddr)> {
    let ServerConfig {
        name,
        addr,
        max_connections,
        max_payload_in_mb,
        max_payload_out_mb,
        methods,
        cors,
    } = config;

    let middleware = ServiceBuilder::new().option_layer(cors_layer(cors)?);
    let server = Server::builder()
        .max_connections(max_connections)
        .max_request_body_size(max_payload_in_mb.saturating_mul(MEGABYTE))
        .max_response_body_size(max_payload_out_mb.saturating_mul(MEGABYTE))
        .set_http_middleware(middleware)
        .build(addr)
        .await
        .with_context(|| format!("Failed to bind {} server on {}", name, addr))?;

    let local_addr = server.local_addr().context("Failed to read server address")?;
    let handle = server.start(methods);
    info!(server = %name, addr = %local_addr, "Running JSON-RPC server");
    Ok((handle, local_addr))
}
