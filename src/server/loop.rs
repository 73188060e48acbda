// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Poll interval while waiting for in-flight connections
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `state.shutdown` is notified.
///
/// After shutdown the listener is closed, idle keep-alive connections are told
/// to close, and in-flight requests get up to `performance.write_timeout`
/// seconds to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.shutdown.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                state.closing.send_replace(true);
                break;
            }
        }
    }

    drop(listener);
    let grace = Duration::from_secs(state.config.performance.write_timeout);
    if wait_for_drain(&active_connections, grace).await {
        logger::log_info("All connections closed");
    } else {
        logger::log_warning(&format!(
            "{} connection(s) still open after {}s, exiting anyway",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
    Ok(())
}

/// Wait until the counter reaches zero; `false` if the grace period ran out
async fn wait_for_drain(active_connections: &AtomicUsize, grace: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + grace;
    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::Request;
    use hyper_util::rt::TokioIo;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let counter = AtomicUsize::new(0);
        assert!(wait_for_drain(&counter, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let counter = AtomicUsize::new(1);
        assert!(!wait_for_drain(&counter, Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_serves_health_then_shuts_down() {
        let mut cfg = Config::build(None, &HashMap::new()).unwrap();
        cfg.logging.access_log = false;
        cfg.performance.write_timeout = 1;
        let state = Arc::new(AppState::new(&cfg));

        let listener = crate::server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::new(AtomicUsize::new(0)),
        ));

        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .uri("/api/health")
            .header("host", addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        drop(sender);

        state.shutdown.notify_one();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_does_not_hold_shutdown() {
        let mut cfg = Config::build(None, &HashMap::new()).unwrap();
        cfg.logging.access_log = false;
        cfg.performance.write_timeout = 30;
        let state = Arc::new(AppState::new(&cfg));
        let active = Arc::new(AtomicUsize::new(0));

        let listener = crate::server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&active),
        ));

        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .uri("/api/health")
            .header("host", addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = sender.send_request(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        resp.into_body().collect().await.unwrap();
        assert_eq!(active.load(Ordering::SeqCst), 1);

        // Client keeps the connection open and idle
        state.shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("shutdown waited for the idle connection")
            .unwrap()
            .unwrap();
        assert_eq!(active.load(Ordering::SeqCst), 0);
        drop(sender);
    }
}
