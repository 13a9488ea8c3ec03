//! Playing a single program.
//!
//! `Player` is shared by the rotation loop and the immediate-play HTTP
//! path: both display through the same driver under the
//! pause-then-resume discipline, so only one navigation command is ever
//! in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use wrconfig::Config;
use wrdriver::DisplayDriver;
use wrplaylist::Program;

use crate::bus::ControlBus;

/// Fixed delay after a driver failure, to slow down retries against a
/// browser that is down or restarting.
const DRIVER_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// How one `play` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The full dwell time elapsed.
    Completed,
    /// A skip signal cut the dwell short.
    Skipped,
    /// A reload signal fired; the caller should abandon the pass.
    Reload,
    /// The driver could not display the program; the backoff has
    /// already been served.
    DriverFailed,
}

enum Wait {
    Elapsed,
    Skipped,
    Reload,
}

pub struct Player {
    driver: Arc<dyn DisplayDriver>,
    bus: Arc<ControlBus>,
    settings: Arc<Config>,
    retry_backoff: Duration,
}

impl Player {
    pub fn new(driver: Arc<dyn DisplayDriver>, bus: Arc<ControlBus>, settings: Arc<Config>) -> Self {
        Self {
            driver,
            bus,
            settings,
            retry_backoff: DRIVER_RETRY_BACKOFF,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Displays `program` and holds it for its dwell time.
    ///
    /// The effective display time is at most `program.duration`: a skip
    /// or reload signal ends the dwell early, never extends it. A
    /// driver failure is not fatal; it is logged and served with the
    /// fixed backoff (itself interruptible) before giving up on this
    /// program.
    pub async fn play(&self, program: &Program) -> PlayOutcome {
        info!(url = %program.url, duration = ?program.duration, "Running program");

        if let Err(e) = self.driver.display(&program.url).await {
            warn!(error = %e, backoff = ?self.retry_backoff, "Display failed, backing off");
            return match self.wait(self.retry_backoff).await {
                Wait::Reload => PlayOutcome::Reload,
                _ => PlayOutcome::DriverFailed,
            };
        }

        if self.settings.get_timer_overlay() && self.driver.supports_overlay() {
            if let Err(e) = self.driver.inject_overlay(program.duration).await {
                warn!(error = %e, "Countdown overlay injection failed");
            }
        }

        match self.wait(program.duration).await {
            Wait::Elapsed => PlayOutcome::Completed,
            Wait::Skipped => {
                info!("Current program skipped");
                PlayOutcome::Skipped
            }
            Wait::Reload => PlayOutcome::Reload,
        }
    }

    /// Waits for whichever comes first: the dwell elapsing, a skip, or
    /// a reload.
    async fn wait(&self, duration: Duration) -> Wait {
        tokio::select! {
            _ = sleep(duration) => Wait::Elapsed,
            _ = self.bus.skip_notified() => Wait::Skipped,
            _ = self.bus.reload_notified() => Wait::Reload,
        }
    }
}
