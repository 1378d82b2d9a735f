use axum::extract::ws::Message;

use super::ConnectionRegistry;
use crate::ws::protocol::ServerEvent;

/// Send an event to a single connection. Unknown ids and closed
/// channels are ignored (fire-and-forget).
pub fn send_to(registry: &ConnectionRegistry, conn_id: &str, event: &ServerEvent) {
    let Ok(json) = serde_json::to_string(event) else {
        return;
    };
    if let Some(sender) = registry.get(conn_id) {
        let _ = sender.send(Message::Text(json.into()));
    }
}

/// Fan an event out to several connections, serializing once.
pub fn send_to_many(registry: &ConnectionRegistry, conn_ids: &[String], event: &ServerEvent) {
    let Ok(json) = serde_json::to_string(event) else {
        return;
    };
    let msg = Message::Text(json.into());

    for conn_id in conn_ids {
        if let Some(sender) = registry.get(conn_id) {
            let _ = sender.send(msg.clone());
        }
    }
}
