//! HTTP hosting runtime
//!
//! Accept loop around the dispatch engine. Cancellation and timeouts for
//! in-flight requests live here, not in the engine.

pub mod connection;
pub mod listener;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::config::AppState;
use crate::logger;
use crate::router::Router;

pub use listener::create_reusable_listener;

/// Run the accept loop until the process is stopped.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    router: Arc<Router<AppState>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &router, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    router: &Arc<Router<AppState>>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= max_conn as usize {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.cached_access_log.load(Ordering::Relaxed) {
        logger::log_connection_accepted(&peer_addr);
    }

    connection::spawn(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(router),
        Arc::clone(conn_counter),
    );
}
