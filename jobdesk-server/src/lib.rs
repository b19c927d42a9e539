use axum::Router;
use jobdesk_core::ServerConfig;
use jobdesk_rest::{company_router, job_router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Build the full Axum application from a ServerConfig.
pub fn build_app(config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(company_router(
            Arc::clone(&config.companies),
            Arc::clone(&config.auth),
        ))
        .merge(job_router(
            Arc::clone(&config.jobs),
            Arc::clone(&config.auth),
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(cors)
}

/// Start the server on the configured port.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let port = config.port;
    let app = build_app(&config);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!(%port, "jobdesk listening");
    axum::serve(listener, app).await?;
    Ok(())
}
