//! Connection Handler
//!
//! Serves admin requests on one connection and records each request's
//! latency and outcome in the telemetry store.

use super::codec::{HttpCodec, HttpResponse};
use crate::admin::{AdminApi, AdminResponse};
use crate::telemetry::NewSecurityEvent;
use futures::{SinkExt, StreamExt};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

/// Connection handler
pub struct Handler {
    api: Arc<AdminApi>,
    peer: String,
    idle_timeout: Duration,
}

impl Handler {
    /// Create a new handler
    pub fn new(api: Arc<AdminApi>, peer: impl Into<String>) -> Self {
        Self {
            api,
            peer: peer.into(),
            idle_timeout: Duration::from_secs(60),
        }
    }

    /// Close the connection when no request arrives within `timeout`
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Run the handler for a connection
    pub async fn run<S>(self, mut framed: Framed<S, HttpCodec>) -> io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let store = self.api.store().clone();

        loop {
            let result = match tokio::time::timeout(self.idle_timeout, framed.next()).await {
                Ok(Some(result)) => result,
                Ok(None) => break,
                Err(_) => {
                    debug!(peer = %self.peer, timeout = ?self.idle_timeout, "Closing idle connection");
                    break;
                }
            };

            let request = match result {
                Ok(request) => request,
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "Rejecting malformed request");
                    store.record_security_event(NewSecurityEvent::blocked_request(
                        &self.peer,
                        &e.to_string(),
                    ));
                    let response = AdminResponse::bad_request("Malformed request");
                    framed.send(HttpResponse::new(response, false)).await?;
                    return Ok(());
                }
            };

            let start = Instant::now();
            let admin_request = request.to_admin_request();
            let keep_alive = request.keep_alive();

            let response = self.api.handle(&admin_request).await;
            let status = response.status;
            let response_ok = response.is_success();
            let sent = framed.send(HttpResponse::new(response, keep_alive)).await;

            // A response that never reached the client counts as a failure
            let success = response_ok && sent.is_ok();
            let elapsed = start.elapsed();
            store.record_request(&admin_request.path, &admin_request.method, elapsed, success);
            debug!(
                method = %admin_request.method,
                path = %admin_request.path,
                status,
                latency = ?elapsed,
                "Request served"
            );
            sent?;

            if !keep_alive {
                break;
            }
        }

        Ok(())
    }
}
