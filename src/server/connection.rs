//! Per-connection serving
//!
//! Adapts raw hyper requests into the dispatch engine's request wrapper
//! and maps handler faults to a 500 reply.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::router::{Router, RouterRequest};

/// Handle a single connection in a spawned task, decrementing the active
/// connection counter when done.
pub fn spawn(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    router: Arc<Router<AppState>>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let keep_alive = state.config.performance.keep_alive_timeout > 0;
        let timeout_duration =
            std::time::Duration::from_secs(state.config.performance.request_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                let router = Arc::clone(&router);
                async move { serve_request(req, peer_addr, state, router).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection timeout after {} seconds",
                timeout_duration.as_secs()
            )),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// One raw request through the dispatch engine.
async fn serve_request(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    router: Arc<Router<AppState>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    // 1. Access log
    if state.cached_access_log.load(Ordering::Relaxed) {
        logger::log_request(req.method(), req.uri(), req.version());
    }

    // 2. Check declared body size before any read
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(resp);
    }

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    // 3. Dispatch; a handler fault becomes a 500 here, not inside the engine
    let wrapped = RouterRequest::from_hyper(req, Some(peer_addr));
    match router.handle(wrapped, Arc::clone(&state)).await {
        Ok(response) => Ok(response),
        Err(err) => {
            logger::log_error(&format!("Handler fault: {err}"));
            Ok(http::build_500_response(
                state.config.http.debug,
                &err.to_string(),
            ))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(req: &Request<Incoming>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}
