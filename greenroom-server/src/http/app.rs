use crate::consensus::Coordinator;
use crate::http::handlers;
use crate::registry::SessionRegistry;
use crate::relay::SignalingRelay;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub relay: SignalingRelay,
    pub coordinator: Coordinator,
    pub registry: Arc<SessionRegistry>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/rooms/{room_id}/signals", post(handlers::send_signal))
        .route(
            "/rooms/{room_id}/peers/{peer_id}/inbox",
            post(handlers::receive_signals),
        )
        .route("/sessions", post(handlers::request_session))
        .route("/sessions/{session_id}/ballots", post(handlers::cast_ballot))
        .route("/sessions/{session_id}/stop", post(handlers::stop_session))
        .route(
            "/rooms/{room_id}/sessions/active/{kind}",
            get(handlers::active_session),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
