//! Config-file watcher.
//!
//! Watches the directory holding `config.yaml` (editors typically
//! rename-replace, so watching the file itself goes stale), reloads the
//! configuration on change and invokes the caller's hook — the app
//! wires that hook to the scheduler's reload signal.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::Config;

/// Starts watching `config`'s file for changes.
///
/// On every modify/create event touching the config file, the
/// configuration is reloaded in place and `on_change` runs. The
/// returned watcher must be kept alive for the lifetime of the process;
/// dropping it stops the watch.
pub fn watch_config<F>(config: Arc<Config>, on_change: F) -> notify::Result<RecommendedWatcher>
where
    F: Fn() + Send + 'static,
{
    let path = PathBuf::from(config.path());
    let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            if !event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name)
            {
                return;
            }
            info!(config_file = %path.display(), "Config file changed, content will change immediately");
            match config.reload() {
                Ok(()) => on_change(),
                Err(e) => warn!(error = %e, "Failed to reload changed config, keeping previous"),
            }
        }
        Err(e) => warn!(error = %e, "Config watcher error"),
    })?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
