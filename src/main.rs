use live_tracker::{router, spawn_session_sweeper, AppState, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    info!(
        utc_offset = %config.utc_offset,
        session_max_age_secs = config.session_max_age.as_secs(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        max_sessions = config.max_sessions,
        "tracker configured"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config);
    let sweeper = spawn_session_sweeper(state.clone());
    let app = router(state);

    info!("listening on http://{addr}");
    info!("dashboard available at http://{addr}/dashboard");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
