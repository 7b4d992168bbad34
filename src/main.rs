use dotenvy::dotenv;
use gatehouse::logging::init_tracing;
use gatehouse::metrics::init_metrics;
use gatehouse::router::init_router;
use gatehouse::signals::{shutdown_signal, spawn_secret_reload};
use gatehouse::state::{AppConfig, init_app_state};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    let _log_guards = init_tracing(&config.server)?;
    let metrics = init_metrics(config.server.metrics_enabled)?;

    let state = init_app_state(&config).await?.with_metrics(metrics);
    spawn_secret_reload(state.tokens.clone());

    let app = init_router(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        address = %address,
        environment = %config.server.environment,
        "Server running; Scalar UI at /scalar"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
