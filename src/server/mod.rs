//! Server Module
//!
//! TCP listener exposing the admin API over HTTP/1.1.

mod codec;
mod config;
mod handler;

pub use codec::{HttpCodec, HttpRequest, HttpResponse, MAX_BODY_SIZE, MAX_HEAD_SIZE};
pub use config::ServerConfig;
pub use handler::Handler;

use crate::admin::AdminApi;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{debug, error, info};

/// Admin HTTP server
pub struct AdminServer {
    config: ServerConfig,
    api: Arc<AdminApi>,
}

impl AdminServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig, api: AdminApi) -> Self {
        Self {
            config,
            api: Arc::new(api),
        }
    }

    /// Run the server
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.address();
        let listener = TcpListener::bind(&addr).await?;

        info!("Admin server listening on {}", addr);
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    debug!("New connection from {}", peer_addr);

                    let api = self.api.clone();
                    let idle_timeout = self.config.idle_timeout;

                    tokio::spawn(async move {
                        let framed = Framed::new(socket, HttpCodec::new());
                        let handler = Handler::new(api, peer_addr.to_string())
                            .with_idle_timeout(idle_timeout);

                        if let Err(e) = handler.run(framed).await {
                            error!("Connection error from {}: {}", peer_addr, e);
                        }

                        debug!("Connection closed: {}", peer_addr);
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }

    /// Get the admin API
    pub fn api(&self) -> &Arc<AdminApi> {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminConfig;
    use crate::logging::LogBuffer;
    use crate::storage::MemoryStorage;
    use crate::telemetry::TelemetryStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let store = Arc::new(TelemetryStore::default());
        let api = AdminApi::new(
            AdminConfig::default(),
            store.clone(),
            Arc::new(MemoryStorage::new()),
            LogBuffer::new(10),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(AdminServer::new(ServerConfig::default(), api).serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /admin/system-health HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains(r#""connected":true"#));

        // Recording happens after the response is written
        for _ in 0..50 {
            if !store.performance().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(store.performance().snapshot()[0].endpoint, "/admin/system-health");
    }
}
