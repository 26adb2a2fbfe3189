// Connection handling module
// Serves one accepted TCP connection with HTTP/1.1 keep-alive

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::error::ServeError;
use crate::handler;
use crate::http::ResponseBody;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Serves HTTP/1.1 with keep-alive through [`serve`]
/// 3. Drops the connection once `timeout` elapses (zero means no limit)
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    settings: Arc<Settings>,
    timeout: Duration,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve(req, Arc::clone(&settings), peer_addr)),
        );

        if timeout.is_zero() {
            if let Err(err) = conn.await {
                logger::log_connection_error(&err);
            }
            return;
        }

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_debug(&format!(
                "Connection from {peer_addr} closed after {} second timeout",
                timeout.as_secs()
            )),
        }
    });
}

/// Run one request through the blocking handler
///
/// The request body is discarded before the handler sees the request. A panic
/// in the handler surfaces as a `JoinError` and is answered with a 500.
pub async fn serve(
    req: Request<Incoming>,
    settings: Arc<Settings>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let (parts, _body) = req.into_parts();
    let req = Arc::new(Request::from_parts(parts, ()));

    let task = {
        let req = Arc::clone(&req);
        let settings = Arc::clone(&settings);
        tokio::task::spawn_blocking(move || handler::handle_request(&*req, &settings, peer_addr))
    };

    let response = match task.await {
        Ok(response) => response,
        Err(err) => handler::handle_fault(
            &*req,
            &settings,
            peer_addr,
            &ServeError::Task(err.to_string()),
        ),
    };
    Ok(response)
}
