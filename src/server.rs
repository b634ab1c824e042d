use eyre::Result;
use hostinguard_config::Config;
use hostinguard_http::{
    create_router,
    AppState,
};
use reqwest::Client as HttpClient;
use std::{
    future::Future,
    time::Duration,
};
use tokio::net::TcpListener;

/// Shared by every upstream call. Only the connect phase is bounded here,
/// status endpoint requests carry their own per-attempt timeout.
pub fn http_client() -> Result<HttpClient> {
    Ok(HttpClient::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Serves the trigger and health endpoints of all configured sites until
/// `shutdown` resolves.
pub async fn serve(config: &Config, listener: TcpListener, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let state = AppState::from_config(config, http_client()?)?;
    let sites = state.site_names().collect::<Vec<_>>().join(", ");

    info!(
        address = %listener.local_addr()?,
        %sites,
        default_site = config.default_site_name().unwrap_or("-"),
        "Listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown requested");
}
