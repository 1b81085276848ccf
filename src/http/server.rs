use crate::core::ConfigProvider;
use crate::http::router::build_router;
use crate::http::state::AppState;
use crate::utils::error::{AppError, Result};
use crate::utils::process::warn_if_root;
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn serve<C: ConfigProvider>(config: &C) -> Result<()> {
    warn_if_root();

    let state = AppState::from_config(config);
    let app = build_router(state, config);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::ServerError {
            message: format!("cannot bind {}: {}", addr, e),
        })?;

    info!(
        workers = config.workers(),
        render_workers = config.render_workers(),
        "Starting markdown-pdf"
    );
    serve_on(listener, app, shutdown_signal()).await
}

pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    info!("markdown-pdf listening on {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::ServerError {
            message: format!("server failed: {}", e),
        })?;

    info!("Server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
