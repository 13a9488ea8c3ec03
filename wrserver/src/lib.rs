//! # WebRotor HTTP control surface
//!
//! `/play`, `/pause`, `/resume` and `/skip` as thin adapters over the
//! rotation core's control bus, served with axum (optionally behind
//! TLS). Only mounted when `apienabled` is set: the API allows
//! unauthenticated remote control of the browser.

mod api;
mod server;

pub use api::{control_router, ControlState, PlayRequest};
pub use server::{ControlServer, TlsPaths};
