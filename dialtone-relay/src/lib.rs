mod relay_service;
mod ws_handler;

pub use relay_service::{ConnId, RelayService};
pub use ws_handler::ws_handler;

use axum::{Router, routing::get};

/// Build the relay's router: a single WebSocket upgrade endpoint.
pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service)
}
