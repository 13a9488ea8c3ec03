//! # WebRotor program lists
//!
//! Loading and validation of the rotation playlist: an ordered CSV of
//! `(url, dwell-duration)` rows. The list is re-read at the top of
//! every playback pass, so edits take effect within one full cycle.

use std::time::Duration;

mod duration;
mod error;
mod loader;

pub use duration::parse_go_duration;
pub use error::{Error, Result};
pub use loader::load_program_list;

/// One playlist entry: a URL and how long to dwell on it.
///
/// Immutable once loaded; a fresh list replaces the old one wholesale
/// on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub url: String,
    pub duration: Duration,
}
