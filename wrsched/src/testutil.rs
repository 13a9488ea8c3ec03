//! Shared test fixtures: a driver double that records invocations, and
//! a scheduler wired against a temp config directory.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;

use wrconfig::Config;
use wrdriver::{DisplayDriver, DriverError};

use crate::bus::ControlBus;
use crate::player::Player;
use crate::scheduler::Scheduler;

#[derive(Default)]
pub(crate) struct RecordingDriver {
    calls: Mutex<Vec<String>>,
    overlay_count: AtomicUsize,
    fail_always: AtomicBool,
    fail_once: AtomicBool,
}

impl RecordingDriver {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn overlay_calls(&self) -> usize {
        self.overlay_count.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_always.store(failing, Ordering::SeqCst);
    }

    /// Fail only the next display call.
    pub fn fail_next(&self) {
        self.fail_once.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DisplayDriver for RecordingDriver {
    async fn display(&self, url: &str) -> wrdriver::Result<()> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.fail_always.load(Ordering::SeqCst) || self.fail_once.swap(false, Ordering::SeqCst)
        {
            return Err(DriverError::Protocol("injected failure".into()));
        }
        Ok(())
    }

    fn supports_overlay(&self) -> bool {
        true
    }

    async fn inject_overlay(&self, _duration: Duration) -> wrdriver::Result<()> {
        self.overlay_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A player over a recording driver, with a temp config directory.
pub(crate) fn recording_player(failing: bool) -> (Player, Arc<RecordingDriver>, TempDir) {
    let dir = TempDir::new().unwrap();
    let settings = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
    let driver = Arc::new(RecordingDriver::default());
    driver.set_failing(failing);
    let bus = Arc::new(ControlBus::new());
    let player = Player::new(driver.clone(), bus, settings);
    (player, driver, dir)
}

/// A scheduler over a recording driver, reading `programs.csv` written
/// into a temp config directory. The retry backoff is shortened so
/// failure paths stay test-sized.
pub(crate) fn scheduler_fixture(
    csv: &str,
) -> (Scheduler, Arc<ControlBus>, Arc<RecordingDriver>, TempDir) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("programs.csv"), csv).unwrap();
    let settings = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
    let driver = Arc::new(RecordingDriver::default());
    let bus = Arc::new(ControlBus::new());
    let player = Player::new(driver.clone(), bus.clone(), settings.clone())
        .with_retry_backoff(Duration::from_millis(50));
    let scheduler = Scheduler::new(Arc::new(player), &bus, settings);
    (scheduler, bus, driver, dir)
}

/// Polls until the driver has seen at least `n` calls, or panics at the
/// deadline.
pub(crate) async fn wait_for_calls(
    driver: &RecordingDriver,
    n: usize,
    deadline: Duration,
) -> Vec<String> {
    let end = Instant::now() + deadline;
    loop {
        let calls = driver.calls();
        if calls.len() >= n {
            return calls;
        }
        if Instant::now() >= end {
            panic!("driver saw {} calls, expected at least {n}", calls.len());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
