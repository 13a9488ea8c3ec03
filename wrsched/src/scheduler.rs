//! The rotation scheduler.
//!
//! One long-lived task owns playback: load the program list, play each
//! entry for its dwell time or until interrupted, honor pause at entry
//! boundaries, reload the list on every full pass. All external
//! steering arrives through the [`ControlBus`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use wrconfig::Config;
use wrplaylist::load_program_list;

use crate::bus::ControlBus;
use crate::player::{PlayOutcome, Player};

/// Fatal scheduler errors. Anything transient (driver trouble, bad
/// playlist rows) is absorbed inside the loop; only an unreadable
/// program file ends the rotation — there is nothing meaningful to
/// play.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Playlist(#[from] wrplaylist::Error),
}

pub struct Scheduler {
    player: Arc<Player>,
    settings: Arc<Config>,
    pause_rx: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(player: Arc<Player>, bus: &ControlBus, settings: Arc<Config>) -> Self {
        Self {
            player,
            settings,
            pause_rx: bus.pause_watch(),
        }
    }

    /// Runs the rotation until the process dies.
    ///
    /// Returns only on a fatal error; the caller turns that into a
    /// non-zero exit.
    pub async fn run(mut self) -> Result<(), SchedulerError> {
        loop {
            self.wait_while_paused().await;

            // Re-read the filename every pass: the configuration can
            // change while we are running.
            let path = self.settings.get_program_file();
            let playlist = load_program_list(&path)?;

            let mut reloaded = false;
            for program in &playlist {
                self.wait_while_paused().await;
                match self.player.play(program).await {
                    PlayOutcome::Reload => {
                        info!("Reload requested, restarting program list from the top");
                        reloaded = true;
                        break;
                    }
                    PlayOutcome::Completed
                    | PlayOutcome::Skipped
                    | PlayOutcome::DriverFailed => {}
                }
            }

            if !reloaded {
                info!("Looping back to play program list from beginning");
            }
        }
    }

    /// Pause gate, evaluated only at entry boundaries: a program that
    /// is already dispatched keeps displaying.
    async fn wait_while_paused(&mut self) {
        if !*self.pause_rx.borrow() {
            return;
        }
        info!("Paused, waiting");
        // Err would mean the bus dropped, which outlives the scheduler
        let _ = self.pause_rx.wait_for(|paused| !paused).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scheduler_fixture, wait_for_calls};
    use std::fs;
    use std::time::Duration;

    #[tokio::test]
    async fn plays_entries_in_order_and_loops() {
        let (scheduler, _bus, driver, _dir) =
            scheduler_fixture("https://a,50ms\nhttps://b,50ms\n");
        let handle = tokio::spawn(scheduler.run());

        // Two entries plus the wrap-around back to the first
        let calls = wait_for_calls(&driver, 3, Duration::from_secs(5)).await;
        assert_eq!(&calls[..3], &["https://a", "https://b", "https://a"]);

        handle.abort();
    }

    #[tokio::test]
    async fn paused_scheduler_never_touches_the_driver() {
        let (scheduler, bus, driver, _dir) = scheduler_fixture("https://a,10s\n");
        bus.set_paused(true);
        let handle = tokio::spawn(scheduler.run());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(driver.calls().is_empty());

        bus.set_paused(false);
        let calls = wait_for_calls(&driver, 1, Duration::from_secs(5)).await;
        assert_eq!(calls[0], "https://a");

        handle.abort();
    }

    #[tokio::test]
    async fn double_skip_advances_exactly_one_entry() {
        let (scheduler, bus, driver, _dir) =
            scheduler_fixture("https://a,10s\nhttps://b,10s\nhttps://c,10s\n");
        let handle = tokio::spawn(scheduler.run());

        wait_for_calls(&driver, 1, Duration::from_secs(5)).await;
        bus.skip();
        bus.skip();

        let calls = wait_for_calls(&driver, 2, Duration::from_secs(5)).await;
        assert_eq!(&calls[..2], &["https://a", "https://b"]);

        // The coalesced second skip must not also consume entry b
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(driver.calls().len(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn reload_restarts_the_pass_with_the_fresh_list() {
        let (scheduler, bus, driver, dir) =
            scheduler_fixture("https://a,10s\nhttps://b,10s\n");
        let handle = tokio::spawn(scheduler.run());

        wait_for_calls(&driver, 1, Duration::from_secs(5)).await;

        fs::write(
            dir.path().join("programs.csv"),
            "https://x,10s\nhttps://y,10s\n",
        )
        .unwrap();
        bus.reload();

        // Not b: the pass restarts from the top of the new list
        let calls = wait_for_calls(&driver, 2, Duration::from_secs(5)).await;
        assert_eq!(&calls[..2], &["https://a", "https://x"]);

        handle.abort();
    }

    #[tokio::test]
    async fn driver_failure_moves_on_to_the_next_entry() {
        let (scheduler, _bus, driver, _dir) =
            scheduler_fixture("https://a,50ms\nhttps://b,50ms\n");
        driver.fail_next();
        let handle = tokio::spawn(scheduler.run());

        let calls = wait_for_calls(&driver, 2, Duration::from_secs(5)).await;
        assert_eq!(&calls[..2], &["https://a", "https://b"]);

        handle.abort();
    }

    #[tokio::test]
    async fn unreadable_program_file_is_fatal() {
        let (scheduler, _bus, driver, dir) = scheduler_fixture("https://a,50ms\n");
        fs::remove_file(dir.path().join("programs.csv")).unwrap();

        let err = scheduler.run().await.unwrap_err();
        assert!(matches!(err, SchedulerError::Playlist(_)));
        assert!(driver.calls().is_empty());
    }
}
