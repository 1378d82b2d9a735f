use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Connections are anonymous; a client
/// declares its display name with the join event. Spawns an actor for
/// the connection.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_accepted(socket, state))
}

/// Handle an accepted WebSocket connection by running the actor.
async fn handle_accepted(socket: WebSocket, state: AppState) {
    actor::run_connection(socket, state).await;
}
