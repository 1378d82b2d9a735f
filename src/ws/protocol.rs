//! The event router: wire format and dispatch for room events.
//!
//! Events are internally-tagged JSON (`{"type": "join", ...}`) with
//! camelCase payload fields. Malformed events are logged and dropped;
//! the connection stays open.

use serde::{Deserialize, Serialize};

use crate::rooms::{Member, UNKNOWN_USER};
use crate::state::AppState;
use crate::ws::broadcast::{send_to, send_to_many};

/// Events a client may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Enter a room under a display name.
    #[serde(rename_all = "camelCase")]
    Join { room_id: String, username: String },

    /// Replace the room's document; relayed to everyone else.
    #[serde(rename_all = "camelCase")]
    CodeChange { room_id: String, code: String },

    /// Push a document directly to one peer (re-sync).
    #[serde(rename_all = "camelCase")]
    SyncCode { socket_id: String, code: String },
}

/// Events the server emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full roster, delivered to every room member after a join.
    #[serde(rename_all = "camelCase")]
    Joined {
        clients: Vec<Member>,
        username: String,
        socket_id: String,
    },

    /// Document update: room broadcast, late-join sync, or directed resend.
    CodeChange { code: String },

    /// A member's connection went away.
    #[serde(rename_all = "camelCase")]
    Disconnected { socket_id: String, username: String },
}

/// Parse and dispatch one inbound text frame.
pub async fn handle_text_message(text: &str, conn_id: &str, state: &AppState) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                conn_id = %conn_id,
                error = %e,
                "Dropping malformed client event"
            );
            return;
        }
    };

    match event {
        ClientEvent::Join { room_id, username } => {
            handle_join(conn_id, &room_id, &username, state).await;
        }
        ClientEvent::CodeChange { room_id, code } => {
            handle_code_change(conn_id, &room_id, code, state).await;
        }
        ClientEvent::SyncCode { socket_id, code } => {
            handle_sync_code(&socket_id, code, state).await;
        }
    }
}

/// Join: record presence, add to the room, send the roster to every
/// member, and push the room's snapshot to the joiner alone if one exists.
async fn handle_join(conn_id: &str, room_id: &str, username: &str, state: &AppState) {
    let mut rooms = state.rooms.lock().await;
    let roster = rooms.join(conn_id, room_id, username);

    tracing::info!(
        conn_id = %conn_id,
        room_id = %room_id,
        username = %username,
        members = roster.len(),
        "Client joined room"
    );

    let targets: Vec<String> = roster.iter().map(|m| m.socket_id.clone()).collect();
    let event = ServerEvent::Joined {
        clients: roster,
        username: username.to_string(),
        socket_id: conn_id.to_string(),
    };
    send_to_many(&state.connections, &targets, &event);

    if let Some(code) = rooms.code(room_id) {
        send_to(
            &state.connections,
            conn_id,
            &ServerEvent::CodeChange {
                code: code.to_string(),
            },
        );
    }
}

/// Broadcast an edit to everyone in the room except the sender and
/// overwrite the room's snapshot (last write wins).
async fn handle_code_change(conn_id: &str, room_id: &str, code: String, state: &AppState) {
    let mut rooms = state.rooms.lock().await;
    let targets = rooms.members_except(room_id, conn_id);
    rooms.set_code(room_id, &code);
    send_to_many(
        &state.connections,
        &targets,
        &ServerEvent::CodeChange { code },
    );
}

/// Directed one-to-one resend. An empty document carries no state worth
/// pushing, so it is skipped.
async fn handle_sync_code(target_id: &str, code: String, state: &AppState) {
    if code.is_empty() {
        return;
    }
    send_to(
        &state.connections,
        target_id,
        &ServerEvent::CodeChange { code },
    );
}

/// Teardown: tell every room the connection belonged to, then purge it
/// from presence and membership.
pub async fn handle_disconnecting(conn_id: &str, state: &AppState) {
    let mut rooms = state.rooms.lock().await;
    let username = rooms
        .username(conn_id)
        .unwrap_or(UNKNOWN_USER)
        .to_string();

    for room_id in rooms.rooms_of(conn_id) {
        let targets = rooms.members_except(&room_id, conn_id);
        if targets.is_empty() {
            continue;
        }
        tracing::debug!(
            conn_id = %conn_id,
            room_id = %room_id,
            "Notifying room of disconnect"
        );
        send_to_many(
            &state.connections,
            &targets,
            &ServerEvent::Disconnected {
                socket_id: conn_id.to_string(),
                username: username.clone(),
            },
        );
    }

    rooms.remove_connection(conn_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_parse_wire_names_and_camel_case_fields() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"join","roomId":"r1","username":"alice"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::Join { room_id, username } if room_id == "r1" && username == "alice"
        ));

        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"code-change","roomId":"r1","code":"x = 1"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::CodeChange { code, .. } if code == "x = 1"
        ));

        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"sync-code","socketId":"abc","code":"x"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::SyncCode { socket_id, .. } if socket_id == "abc"
        ));
    }

    #[test]
    fn server_events_serialize_with_wire_names() {
        let event = ServerEvent::Joined {
            clients: vec![Member {
                socket_id: "c1".to_string(),
                username: "alice".to_string(),
            }],
            username: "alice".to_string(),
            socket_id: "c1".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "joined");
        assert_eq!(value["socketId"], "c1");
        assert_eq!(value["clients"][0]["socketId"], "c1");
        assert_eq!(value["clients"][0]["username"], "alice");

        let value =
            serde_json::to_value(ServerEvent::Disconnected {
                socket_id: "c1".to_string(),
                username: "alice".to_string(),
            })
            .unwrap();
        assert_eq!(value["type"], "disconnected");

        let value = serde_json::to_value(ServerEvent::CodeChange {
            code: "x".to_string(),
        })
        .unwrap();
        assert_eq!(value["type"], "code-change");
    }

    #[test]
    fn unknown_or_incomplete_events_are_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"join","roomId":"r1"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }
}
