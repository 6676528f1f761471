// routes.rs
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::{handlers, ws};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/poll", post(handlers::create_poll).get(handlers::poll_snapshot))
        .route("/vote", post(handlers::submit_vote))
        .route("/ws", get(ws::subscribe))
        .layer(cors)
        .with_state(state)
}
