//! # WebRotor rotation core
//!
//! Owns playback state and arbitrates between autonomous looping and
//! externally raised interrupts:
//!
//! - [`ControlBus`] — the pause flag and the coalescing skip/reload
//!   signals, shared between every control adapter and the scheduler.
//! - [`Player`] — displays one program and serves its dwell time,
//!   racing the dwell against skip/reload.
//! - [`Scheduler`] — the indefinite rotation loop.

mod bus;
mod player;
mod scheduler;
#[cfg(test)]
mod testutil;

pub use bus::ControlBus;
pub use player::{PlayOutcome, Player};
pub use scheduler::{Scheduler, SchedulerError};
