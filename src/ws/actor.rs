use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::state::AppState;
use crate::ws::protocol;

/// Run the actor-per-connection pattern for an accepted WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from an mpsc channel
/// - Reader loop: parses incoming events and hands them to the router
///
/// The mpsc channel allows any part of the system to send messages to
/// this client by cloning the sender out of the connection registry.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4().to_string();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    state.connections.insert(conn_id.clone(), tx.clone());
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Spawn writer task: forwards mpsc messages to the WebSocket sink
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Reader loop: process incoming WebSocket messages
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    protocol::handle_text_message(text.as_str(), &conn_id, &state).await;
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::info!(
                        conn_id = %conn_id,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
                _ => {}
            },
            Some(Err(e)) => {
                tracing::warn!(
                    conn_id = %conn_id,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(conn_id = %conn_id, "WebSocket stream ended");
                break;
            }
        }
    }

    // Notify rooms before purging so remaining members learn who left.
    protocol::handle_disconnecting(&conn_id, &state).await;
    state.connections.remove(&conn_id);
    writer_handle.abort();

    tracing::info!(conn_id = %conn_id, "WebSocket actor stopped");
}

/// Writer task: receives messages from the mpsc channel and forwards them
/// to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}
