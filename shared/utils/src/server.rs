use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    serve, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ServerConfig;

/// Tracing, compression, CORS and the upload size limit every service runs behind.
pub fn with_common_layers(app: Router, config: &ServerConfig) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            )
            .layer(DefaultBodyLimit::max(config.max_request_size)),
    )
}

pub async fn serve_on(app: Router, port: u16, label: &str) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    info!("{} listening on {}", label, addr);

    serve(listener, app).await?;
    Ok(())
}
