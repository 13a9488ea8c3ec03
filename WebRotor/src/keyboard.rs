//! Blocking keyboard listener.
//!
//! For an operator sitting at the controlled machine: any single byte
//! on stdin means "resume and move on to the next program".

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use wrsched::ControlBus;

pub async fn read_keyboard_loop(bus: Arc<ControlBus>) {
    let mut stdin = tokio::io::stdin();
    let mut byte = [0u8; 1];
    loop {
        match stdin.read(&mut byte).await {
            Ok(0) => {
                debug!("stdin closed, keyboard listener exiting");
                return;
            }
            Ok(_) => {
                info!("Keyboard input received, moving to the next program");
                bus.set_paused(false);
                bus.skip();
            }
            Err(e) => {
                warn!(error = %e, "Keyboard listener error, exiting");
                return;
            }
        }
    }
}
