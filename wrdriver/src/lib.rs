//! # WebRotor display drivers
//!
//! The scheduler talks to the controlled browser through one narrow
//! contract: `display(url)`, plus an optional countdown-overlay
//! capability. One implementation per backend; nothing outside this
//! crate branches on backend identity.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wrconfig::Config;

mod cdp;
mod errors;
mod marionette;
mod overlay;
mod remote_control;

pub use cdp::CdpDriver;
pub use errors::{DriverError, Result};
pub use marionette::MarionetteDriver;
pub use overlay::overlay_script;
pub use remote_control::RemoteControlDriver;

/// The display surface contract.
///
/// `display` instructs the controlled browser to present `url` and
/// returns once the navigation is acknowledged. Implementations connect
/// per call: the browser may be restarted between entries.
#[async_trait]
pub trait DisplayDriver: Send + Sync {
    async fn display(&self, url: &str) -> Result<()>;

    /// Whether this backend can inject the countdown overlay.
    fn supports_overlay(&self) -> bool {
        false
    }

    /// Injects the countdown overlay into the currently displayed page.
    /// Only meaningful when `supports_overlay()` is true; the default
    /// is a no-op.
    async fn inject_overlay(&self, duration: Duration) -> Result<()> {
        let _ = duration;
        Ok(())
    }

    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn DisplayDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayDriver").field("name", &self.name()).finish()
    }
}

/// Builds the configured driver.
///
/// Fatal-startup when `driver` names an unknown backend or
/// `browser_address` is missing.
pub fn driver_from_config(config: &Config) -> Result<Arc<dyn DisplayDriver>> {
    let address = config.get_browser_address()?;
    let selector = config.get_driver();

    let driver: Arc<dyn DisplayDriver> = match selector.as_str() {
        "remote" => Arc::new(RemoteControlDriver::new(address)),
        "marionette" => Arc::new(MarionetteDriver::new(address)),
        "cdp" => Arc::new(CdpDriver::new(address)),
        other => return Err(DriverError::UnknownDriver(other.to_string())),
    };

    tracing::info!(driver = driver.name(), "Display driver configured");
    Ok(driver)
}
