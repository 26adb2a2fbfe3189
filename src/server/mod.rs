// Server module entry point
// Accept loop, per-connection serving and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::logger;

// Re-export commonly used items
pub use connection::handle_connection;
pub use listener::create_reusable_listener;
pub use signal::wait_for_shutdown;

/// Accept connections until SIGINT or SIGTERM
///
/// Each connection is served on its own task. Accept errors are logged and
/// the loop keeps going.
pub async fn run(listener: TcpListener, settings: Arc<Settings>, timeout: Duration) {
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&settings), timeout);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    logger::log_info("Listener closed, exiting");
}
