//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for ctrl-c, then trigger `shutdown`.
pub async fn trigger_on_ctrl_c(shutdown: &Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt received, shutting down"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for ctrl-c, shutting down"),
    }
    shutdown.trigger();
}
