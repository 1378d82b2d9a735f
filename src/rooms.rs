//! Room state: presence, membership, and code snapshots.
//!
//! All three maps live behind one async Mutex so every inbound event
//! mutates them to completion before the next one starts (single-writer
//! invariant). Rooms spring into existence on first join and are
//! garbage-collected, snapshot included, when the last member leaves.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub type ConnId = String;
pub type RoomId = String;

/// Placeholder username for connections with no presence entry.
pub const UNKNOWN_USER: &str = "unknown";

/// One roster entry as delivered in `joined` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub socket_id: ConnId,
    pub username: String,
}

/// In-memory room state. Mutated only through the event router.
#[derive(Debug, Default)]
pub struct Rooms {
    /// Presence registry: connection id -> display name
    presence: HashMap<ConnId, String>,
    /// Membership index: room id -> member connection ids
    members: HashMap<RoomId, HashSet<ConnId>>,
    /// Reverse index: connection id -> rooms it joined (needed for teardown)
    joined: HashMap<ConnId, HashSet<RoomId>>,
    /// Last-known full document text per room
    code: HashMap<RoomId, String>,
}

pub type SharedRooms = Arc<Mutex<Rooms>>;

pub fn new_shared_rooms() -> SharedRooms {
    Arc::new(Mutex::new(Rooms::default()))
}

impl Rooms {
    /// Record presence and add the connection to the room (idempotent).
    /// Returns the full roster including the joiner.
    pub fn join(&mut self, conn_id: &str, room_id: &str, username: &str) -> Vec<Member> {
        self.presence
            .insert(conn_id.to_string(), username.to_string());
        self.members
            .entry(room_id.to_string())
            .or_default()
            .insert(conn_id.to_string());
        self.joined
            .entry(conn_id.to_string())
            .or_default()
            .insert(room_id.to_string());
        self.roster(room_id)
    }

    /// Current (connection id, username) pairs for a room. Order is not
    /// significant.
    pub fn roster(&self, room_id: &str) -> Vec<Member> {
        self.members
            .get(room_id)
            .map(|conns| {
                conns
                    .iter()
                    .map(|conn_id| Member {
                        socket_id: conn_id.clone(),
                        username: self
                            .presence
                            .get(conn_id)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Member connection ids of a room, excluding one connection.
    pub fn members_except(&self, room_id: &str, except: &str) -> Vec<ConnId> {
        self.members
            .get(room_id)
            .map(|conns| {
                conns
                    .iter()
                    .filter(|conn_id| conn_id.as_str() != except)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn username(&self, conn_id: &str) -> Option<&str> {
        self.presence.get(conn_id).map(String::as_str)
    }

    /// Rooms the connection currently belongs to.
    pub fn rooms_of(&self, conn_id: &str) -> Vec<RoomId> {
        self.joined
            .get(conn_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Overwrite the room's snapshot wholesale (last write wins).
    pub fn set_code(&mut self, room_id: &str, code: &str) {
        self.code.insert(room_id.to_string(), code.to_string());
    }

    pub fn code(&self, room_id: &str) -> Option<&str> {
        self.code.get(room_id).map(String::as_str)
    }

    /// Purge a connection: presence entry, every membership, and any room
    /// (snapshot included) left without members.
    pub fn remove_connection(&mut self, conn_id: &str) {
        self.presence.remove(conn_id);
        let Some(rooms) = self.joined.remove(conn_id) else {
            return;
        };
        for room_id in rooms {
            if let Some(conns) = self.members.get_mut(&room_id) {
                conns.remove(conn_id);
                if conns.is_empty() {
                    self.members.remove(&room_id);
                    self.code.remove(&room_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn usernames(roster: &[Member]) -> HashSet<&str> {
        roster.iter().map(|m| m.username.as_str()).collect()
    }

    #[test]
    fn join_returns_full_roster_including_joiner() {
        let mut rooms = Rooms::default();
        let roster = rooms.join("c1", "room", "alice");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].socket_id, "c1");

        let roster = rooms.join("c2", "room", "bob");
        assert_eq!(roster.len(), 2);
        assert_eq!(usernames(&roster), HashSet::from(["alice", "bob"]));
    }

    #[test]
    fn join_is_idempotent() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "room", "alice");
        let roster = rooms.join("c1", "room", "alice");
        assert_eq!(roster.len(), 1);
        assert_eq!(rooms.rooms_of("c1"), vec!["room".to_string()]);
    }

    #[test]
    fn members_except_excludes_the_sender() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "room", "alice");
        rooms.join("c2", "room", "bob");
        assert_eq!(rooms.members_except("room", "c1"), vec!["c2".to_string()]);
        assert!(rooms.members_except("ghost-room", "c1").is_empty());
    }

    #[test]
    fn snapshot_is_last_write_wins() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "room", "alice");
        rooms.set_code("room", "X");
        rooms.set_code("room", "Y");
        assert_eq!(rooms.code("room"), Some("Y"));
        assert_eq!(rooms.code("other"), None);
    }

    #[test]
    fn connection_can_belong_to_several_rooms() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "a", "alice");
        rooms.join("c1", "b", "alice");
        let mut of = rooms.rooms_of("c1");
        of.sort();
        assert_eq!(of, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn remove_connection_purges_presence_and_membership() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "room", "alice");
        rooms.join("c2", "room", "bob");
        rooms.set_code("room", "X");

        rooms.remove_connection("c1");
        assert_eq!(rooms.username("c1"), None);
        assert!(rooms.rooms_of("c1").is_empty());
        // Room still has a member, so the snapshot survives.
        assert_eq!(rooms.code("room"), Some("X"));
        assert_eq!(rooms.roster("room").len(), 1);
    }

    #[test]
    fn emptied_room_is_collected_with_its_snapshot() {
        let mut rooms = Rooms::default();
        rooms.join("c1", "room", "alice");
        rooms.set_code("room", "X");

        rooms.remove_connection("c1");
        assert!(rooms.roster("room").is_empty());
        assert_eq!(rooms.code("room"), None);
    }

    #[test]
    fn unjoined_connection_has_no_presence() {
        let rooms = Rooms::default();
        assert_eq!(rooms.username("ghost"), None);
        assert!(rooms.rooms_of("ghost").is_empty());
    }
}
