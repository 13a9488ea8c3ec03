use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wrconfig::{get_config, watch_config, Config};
use wrdriver::driver_from_config;
use wrsched::{ControlBus, Player, Scheduler};
use wrserver::{ControlServer, ControlState, TlsPaths};

mod keyboard;

#[derive(Parser)]
#[command(name = "webrotor", version, about = "Rotates a remote-controlled browser through a playlist of web pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the version and exit
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(Command::Version) = cli.command {
        println!("webrotor version: {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // ========== Phase 1: configuration ==========

    let config = get_config();
    init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting webrotor");

    // Fatal-startup: no usable driver means nothing to rotate
    let driver = driver_from_config(&config)?;

    // ========== Phase 2: rotation core ==========

    let bus = Arc::new(ControlBus::new());
    let player = Arc::new(Player::new(driver, bus.clone(), config.clone()));
    let scheduler = Scheduler::new(player.clone(), &bus, config.clone());

    // Keep the watcher alive for the process lifetime; a config change
    // reloads settings and interrupts the current playlist pass.
    let watcher_bus = bus.clone();
    let _watcher = watch_config(config.clone(), move || watcher_bus.reload())?;

    // ========== Phase 3: control surfaces ==========

    if config.get_interactive() {
        info!("Interactive mode: any keypress skips to the next program");
        tokio::spawn(keyboard::read_keyboard_loop(bus.clone()));
    }

    if config.get_api_enabled() {
        let port = config.get_http_port();
        warn!(
            port,
            "Starting API server. NOTICE: this allows UNAUTHENTICATED remote control \
             of the browser; set 'apienabled: false' in config.yaml to disable"
        );
        let tls = config.get_tls_enabled().then(|| TlsPaths {
            cert: config.get_tls_cert_path(),
            key: config.get_tls_key_path(),
        });
        let state = ControlState {
            player: player.clone(),
            bus: bus.clone(),
        };
        let server = ControlServer::new(state, port);
        tokio::spawn(async move {
            if let Err(e) = server.serve(tls).await {
                error!(error = %e, "Control surface server failed");
            }
        });
    } else {
        info!(
            "REST API not enabled in configuration and will be unavailable; \
             set 'apienabled: true' in config.yaml to use it"
        );
    }

    // ========== Phase 4: rotate until killed ==========

    // run() only returns on a fatal error (unreadable program file);
    // propagating it exits non-zero with a diagnostic.
    scheduler.run().await?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
