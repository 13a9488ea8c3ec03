//! Chrome DevTools driver.
//!
//! Navigates by opening the target in a tab through the debugging HTTP
//! endpoint (`/json/new`). Newer Chrome requires PUT for this endpoint;
//! older versions only accept GET, so a 405 falls back. No websocket
//! session is held, which also means no overlay injection with this
//! backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::errors::{DriverError, Result};
use crate::DisplayDriver;

pub struct CdpDriver {
    base_url: String,
    client: reqwest::Client,
}

impl CdpDriver {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            base_url: format!("http://{}", address.into()),
            client: reqwest::Client::new(),
        }
    }

    fn new_tab_endpoint(&self, url: &str) -> String {
        format!("{}/json/new?{}", self.base_url, urlencoding::encode(url))
    }
}

#[async_trait]
impl DisplayDriver for CdpDriver {
    async fn display(&self, url: &str) -> Result<()> {
        let endpoint = self.new_tab_endpoint(url);

        let mut response = self.client.put(&endpoint).send().await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            debug!("Debugging endpoint rejected PUT, retrying as GET");
            response = self.client.get(&endpoint).send().await?;
        }

        let response = response.error_for_status()?;
        debug!(url, status = %response.status(), "DevTools opened target");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cdp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_target_url() {
        let driver = CdpDriver::new("localhost:9222");
        assert_eq!(
            driver.new_tab_endpoint("https://a.example/?x=1&y=2"),
            "http://localhost:9222/json/new?https%3A%2F%2Fa.example%2F%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn reports_no_overlay_support() {
        assert!(!CdpDriver::new("localhost:9222").supports_overlay());
    }
}
