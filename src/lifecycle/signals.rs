//! OS signal handling.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Trigger `shutdown` on Ctrl-C.
pub fn install(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
        }
    })
}
