//! Serving the control surface.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum_server::tls_rustls::RustlsConfig;
use tokio::signal;
use tracing::info;

use crate::api::{control_router, ControlState};

/// Certificate/key pair for the TLS-enabled control surface.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

pub struct ControlServer {
    http_port: u16,
    state: ControlState,
}

impl ControlServer {
    pub fn new(state: ControlState, http_port: u16) -> Self {
        Self { http_port, state }
    }

    /// Serves until Ctrl+C (plain HTTP) or process death.
    pub async fn serve(self, tls: Option<TlsPaths>) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.http_port));
        let router = control_router(self.state);

        match tls {
            Some(paths) => {
                info!(port = self.http_port, "Control surface listening with TLS, use https");
                let rustls = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
                axum_server::bind_rustls(addr, rustls)
                    .serve(router.into_make_service())
                    .await?;
            }
            None => {
                info!(port = self.http_port, "Control surface listening");
                let listener = tokio::net::TcpListener::bind(addr).await?;
                axum::serve(listener, router.into_make_service())
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
            }
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Ctrl+C received, control surface shutting down");
    }
}
