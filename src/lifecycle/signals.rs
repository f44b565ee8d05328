//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM are translated into a stop request on
//! the host lifetime.

use std::sync::Arc;

use crate::lifecycle::shutdown::ApplicationLifetime;

/// Wait for the first termination signal.
pub async fn wait_for_termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}

/// Spawn a task that requests application stop on the first signal.
pub fn spawn_signal_listener(lifetime: Arc<dyn ApplicationLifetime>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_termination().await;
        lifetime.stop_application();
    })
}
