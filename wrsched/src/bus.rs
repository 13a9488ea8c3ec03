//! Control signal bus.
//!
//! The one place where playback is steered from outside: HTTP handlers,
//! the keyboard listener and the config watcher all hold an
//! `Arc<ControlBus>`; the scheduler is the single consumer.
//!
//! Pause is a `watch` channel, so reads and writes are linearizable and
//! the scheduler unparks as soon as the flag clears. Skip and reload
//! are one-shot coalescing signals: raising one that is already pending
//! is a no-op, and a signal raised with no waiter is observed by the
//! very next wait.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{watch, Notify};
use tracing::info;

/// A one-shot, non-buffered notification.
///
/// `Notify` alone is not enough: its permit is consumed the instant the
/// waiter wakes, so a second raise arriving in that window would store
/// a fresh permit and fire twice. The `raised` flag closes the window —
/// it stays set until the consumer has actually observed the signal,
/// and raises in between collapse into it.
struct Signal {
    raised: AtomicBool,
    notify: Notify,
}

impl Signal {
    fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    fn raise(&self) {
        if !self.raised.swap(true, Ordering::SeqCst) {
            self.notify.notify_one();
        }
    }

    async fn observed(&self) {
        self.notify.notified().await;
        self.raised.store(false, Ordering::SeqCst);
    }
}

pub struct ControlBus {
    paused: watch::Sender<bool>,
    skip: Signal,
    reload: Signal,
}

impl ControlBus {
    pub fn new() -> Self {
        Self {
            paused: watch::channel(false).0,
            skip: Signal::new(),
            reload: Signal::new(),
        }
    }

    /// Sets the pause flag. Idempotent.
    pub fn set_paused(&self, paused: bool) {
        let previous = self.paused.send_replace(paused);
        if previous != paused {
            info!(paused, "Playback pause state changed");
        }
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// A receiver for the scheduler's pause gate.
    pub fn pause_watch(&self) -> watch::Receiver<bool> {
        self.paused.subscribe()
    }

    /// Abandon the entry currently displayed or waited on. Raising an
    /// already-pending skip is a no-op.
    pub fn skip(&self) {
        self.skip.raise();
    }

    /// Abandon the whole playlist pass so the next pass picks up fresh
    /// configuration and playlist. Coalesces like `skip`.
    pub fn reload(&self) {
        self.reload.raise();
    }

    pub(crate) async fn skip_notified(&self) {
        self.skip.observed().await
    }

    pub(crate) async fn reload_notified(&self) {
        self.reload.observed().await
    }
}

impl Default for ControlBus {
    fn default() -> Self {
        Self::new()
    }
}
