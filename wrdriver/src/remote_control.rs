//! Remote-control line protocol driver.
//!
//! Talks to the legacy browser remote-control plugin: one TCP
//! connection per navigation, send `window.location='<url>'`, read back
//! a single JSON status line and check its `result` echoes the URL.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::errors::{DriverError, Result};
use crate::DisplayDriver;

pub struct RemoteControlDriver {
    address: String,
}

impl RemoteControlDriver {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl DisplayDriver for RemoteControlDriver {
    async fn display(&self, url: &str) -> Result<()> {
        let mut stream =
            TcpStream::connect(&self.address)
                .await
                .map_err(|source| DriverError::Connect {
                    address: self.address.clone(),
                    source,
                })?;

        stream
            .write_all(format!("window.location='{url}'\n").as_bytes())
            .await?;

        let mut status = String::new();
        BufReader::new(stream).read_line(&mut status).await?;

        let parsed: Value = serde_json::from_str(status.trim())
            .map_err(|_| DriverError::Protocol(format!("unparseable status line: {status:?}")))?;

        if parsed.get("result").and_then(Value::as_str) == Some(url) {
            debug!(url, "Remote control confirmed navigation");
            Ok(())
        } else {
            Err(DriverError::Protocol(format!(
                "URL didn't load as desired: {}",
                status.trim()
            )))
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn fake_plugin(reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(reply.as_bytes()).await.unwrap();
        });
        address
    }

    #[tokio::test]
    async fn accepts_matching_result() {
        let address = fake_plugin("{\"result\":\"https://example.com\"}\n").await;
        let driver = RemoteControlDriver::new(address);
        driver.display("https://example.com").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_mismatched_result() {
        let address = fake_plugin("{\"result\":\"about:blank\"}\n").await;
        let driver = RemoteControlDriver::new(address);
        let err = driver.display("https://example.com").await.unwrap_err();
        assert!(matches!(err, DriverError::Protocol(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_connect_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let driver = RemoteControlDriver::new(address);
        let err = driver.display("https://example.com").await.unwrap_err();
        assert!(matches!(err, DriverError::Connect { .. }));
    }

    #[test]
    fn reports_no_overlay_support() {
        assert!(!RemoteControlDriver::new("127.0.0.1:32000").supports_overlay());
    }
}
