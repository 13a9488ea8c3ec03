//! Control surface endpoints.
//!
//! Thin adapters over the [`ControlBus`]: every handler translates one
//! HTTP request into bus operations (plus, for `/play`, one pass
//! through the shared [`Player`]). Responses are one-line plain text.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use wrplaylist::{parse_go_duration, Program};
use wrsched::{ControlBus, Player};

/// Shared handler state: the bus for pause/skip, the player for
/// immediate playback.
#[derive(Clone)]
pub struct ControlState {
    pub player: Arc<Player>,
    pub bus: Arc<ControlBus>,
}

/// Router for the `/play`, `/pause`, `/resume` and `/skip` endpoints.
/// Every endpoint answers both GET and POST.
pub fn control_router(state: ControlState) -> Router {
    Router::new()
        .route("/play", get(play_query).post(play_form))
        .route("/pause", get(pause).post(pause))
        .route("/resume", get(resume).post(resume))
        .route("/skip", get(skip).post(skip))
        .with_state(state)
}

/// Ad-hoc playback request: a target plus a Go-syntax duration.
#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub url: String,
    pub duration: String,
}

async fn play_query(
    State(state): State<ControlState>,
    Query(request): Query<PlayRequest>,
) -> Response {
    run_play(state, request).await
}

async fn play_form(
    State(state): State<ControlState>,
    Form(request): Form<PlayRequest>,
) -> Response {
    run_play(state, request).await
}

/// Pause the rotation, play the requested program once, resume.
///
/// The pause-then-resume discipline keeps the autonomous loop from
/// invoking the driver while this program is in flight.
async fn run_play(state: ControlState, request: PlayRequest) -> Response {
    let duration = match parse_go_duration(&request.duration) {
        Ok(d) => d,
        Err(_) => {
            info!(duration = %request.duration, "Program rejected, invalid duration");
            return (
                StatusCode::BAD_REQUEST,
                "Program rejected. Invalid duration.\n",
            )
                .into_response();
        }
    };

    let program = Program {
        url: request.url,
        duration,
    };
    info!(url = %program.url, ?duration, "Immediate play from web request");

    state.bus.set_paused(true);
    state.player.play(&program).await;
    state.bus.set_paused(false);

    (StatusCode::OK, "Program accepted\n").into_response()
}

async fn pause(State(state): State<ControlState>) -> &'static str {
    info!("Paused from web request");
    state.bus.set_paused(true);
    "Ok, paused.\n"
}

async fn resume(State(state): State<ControlState>) -> &'static str {
    info!("Unpausing from web request");
    state.bus.set_paused(false);
    "Ok, unpaused.\n"
}

async fn skip(State(state): State<ControlState>) -> &'static str {
    info!("Skipping from web request");
    state.bus.set_paused(false);
    state.bus.skip();
    "Skipping current program and resuming rotation.\n"
}
