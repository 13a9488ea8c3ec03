//! Firefox Marionette driver.
//!
//! Marionette frames are `<byte length>:<json>`; the server greets with
//! an application-info frame on connect, then speaks request/response
//! arrays: `[0, id, command, params]` out, `[1, id, error, result]`
//! back. One connection (and thus one session) per navigation: the
//! browser may restart between entries, a held session would go stale.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::errors::{DriverError, Result};
use crate::overlay::overlay_script;
use crate::DisplayDriver;

pub struct MarionetteDriver {
    address: String,
}

impl MarionetteDriver {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    async fn session(&self) -> Result<MarionetteSession<TcpStream>> {
        let stream =
            TcpStream::connect(&self.address)
                .await
                .map_err(|source| DriverError::Connect {
                    address: self.address.clone(),
                    source,
                })?;
        let mut session = MarionetteSession::handshake(stream).await?;
        session.command("WebDriver:NewSession", json!({})).await?;
        Ok(session)
    }
}

#[async_trait]
impl DisplayDriver for MarionetteDriver {
    async fn display(&self, url: &str) -> Result<()> {
        let mut session = self.session().await?;
        session
            .command("WebDriver:Navigate", json!({ "url": url }))
            .await?;
        debug!(url, "Marionette navigation complete");
        Ok(())
    }

    fn supports_overlay(&self) -> bool {
        true
    }

    async fn inject_overlay(&self, duration: Duration) -> Result<()> {
        let mut session = self.session().await?;
        session
            .command(
                "WebDriver:ExecuteScript",
                json!({ "script": overlay_script(duration), "args": [] }),
            )
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "marionette"
    }
}

/// One Marionette connection. Generic over the transport so the frame
/// codec is testable without a browser.
#[derive(Debug)]
struct MarionetteSession<S> {
    stream: S,
    next_id: u64,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> MarionetteSession<S> {
    /// Consumes the server greeting frame.
    async fn handshake(stream: S) -> Result<Self> {
        let mut session = Self { stream, next_id: 0 };
        let hello = session.recv().await?;
        debug!(greeting = %hello, "Marionette server hello");
        Ok(session)
    }

    async fn send(&mut self, body: &Value) -> Result<()> {
        let payload = serde_json::to_string(body)?;
        let frame = format!("{}:{}", payload.len(), payload);
        self.stream.write_all(frame.as_bytes()).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Value> {
        let mut len_digits = Vec::new();
        loop {
            let byte = self.stream.read_u8().await?;
            if byte == b':' {
                break;
            }
            len_digits.push(byte);
        }
        let len: usize = std::str::from_utf8(&len_digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                DriverError::Protocol(format!("bad frame length prefix: {len_digits:?}"))
            })?;

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload).await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// Sends one command and waits for its response frame.
    async fn command(&mut self, name: &str, params: Value) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&json!([0, id, name, params])).await?;

        loop {
            let msg = self.recv().await?;
            let frame = msg
                .as_array()
                .filter(|a| a.len() == 4)
                .ok_or_else(|| DriverError::Protocol(format!("malformed frame: {msg}")))?;

            // Responses to other ids can't happen on a fresh connection,
            // but skip them rather than misattribute a result.
            if frame[0] != json!(1) || frame[1] != json!(id) {
                continue;
            }
            if !frame[2].is_null() {
                return Err(DriverError::Protocol(format!(
                    "{name} failed: {}",
                    frame[2]
                )));
            }
            return Ok(frame[3].clone());
        }
    }
}
