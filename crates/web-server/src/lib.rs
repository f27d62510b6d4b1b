use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::Config;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the binary, not here.

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Builds the application router with all routes and middleware.
pub fn router(config: Config) -> Router {
    let body_limit = config.server.body_limit_bytes;
    let app_state = Arc::new(AppState {
        config: Arc::new(config),
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/risk/estimate", post(handlers::estimate))
        .route("/api/simulations", post(handlers::simulate))
        .route("/ws", get(handlers::websocket_handler))
        .with_state(app_state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}

/// The main function to configure and run the web server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let app = router(config);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
