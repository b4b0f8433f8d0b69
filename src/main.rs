use std::sync::Arc;

use charity_dashboard::api::HttpBackend;
use charity_dashboard::config::DashboardConfig;
use charity_dashboard::routes;
use charity_dashboard::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let backend = HttpBackend::new(&config.backend_url, config.timeouts).expect("backend client build failed");
    tracing::info!(backend = backend.base_url(), "backend client initialized");

    let port = config.port;
    let state = AppState::new(config, Arc::new(backend));

    // Warm the settings cache so the first stylesheet carries the site color.
    state.refetch.mounted();

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "charity dashboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
