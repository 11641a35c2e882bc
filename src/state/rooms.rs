//! In-process registry of socket rooms and their members.
//!
//! A room is named after a play identifier; each member holds the sender half
//! of its connection's writer channel. Broadcasts are best-effort: a closed
//! writer only logs, the member is cleaned up when its socket task ends.

use axum::extract::ws::Message;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::auth::token::RoomRole;

/// Handle used to push messages to one connected socket.
#[derive(Clone)]
pub struct RoomMember {
    /// Unique id of this connection (not the participant).
    pub connection_id: Uuid,
    /// Subject carried by the room token (play or player id).
    pub subject: Uuid,
    /// Role within the room.
    pub role: RoomRole,
    /// Writer channel of the connection.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Registry of all rooms in this process.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, DashMap<Uuid, RoomMember>>,
}

impl RoomRegistry {
    /// Fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a room, creating the room on first join.
    pub fn join(&self, room: &str, member: RoomMember) {
        self.rooms
            .entry(room.to_owned())
            .or_default()
            .insert(member.connection_id, member);
    }

    /// Remove a member; the room itself is pruned once empty.
    pub fn leave(&self, room: &str, connection_id: Uuid) {
        let emptied = if let Some(members) = self.rooms.get(room) {
            members.remove(&connection_id);
            members.is_empty()
        } else {
            false
        };
        if emptied {
            self.rooms.remove_if(room, |_, members| members.is_empty());
        }
    }

    /// Number of members currently in a room.
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|members| members.len()).unwrap_or(0)
    }

    /// Send a payload to every member of a room, the sender included.
    pub fn broadcast<T: Serialize>(&self, room: &str, payload: &T) {
        self.send_filtered(room, payload, |_| true);
    }

    /// Send a payload to every member except the originating connection.
    pub fn broadcast_except<T: Serialize>(&self, room: &str, except: Uuid, payload: &T) {
        self.send_filtered(room, payload, |member| member.connection_id != except);
    }

    fn send_filtered<T: Serialize>(
        &self,
        room: &str,
        payload: &T,
        keep: impl Fn(&RoomMember) -> bool,
    ) {
        let Ok(text) = serde_json::to_string(payload) else {
            warn!(room, "failed to serialize room broadcast");
            return;
        };
        let Some(members) = self.rooms.get(room) else {
            return;
        };
        for member in members.iter().filter(|entry| keep(entry.value())) {
            if member.tx.send(Message::Text(text.clone().into())).is_err() {
                warn!(
                    room,
                    connection_id = %member.connection_id,
                    "dropping broadcast to closed socket writer"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Ping {
        seq: u32,
    }

    fn member(role: RoomRole) -> (RoomMember, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            RoomMember {
                connection_id: Uuid::new_v4(),
                subject: Uuid::new_v4(),
                role,
                tx,
            },
            rx,
        )
    }

    fn recv_ping(rx: &mut mpsc::UnboundedReceiver<Message>) -> Option<Ping> {
        match rx.try_recv().ok()? {
            Message::Text(text) => serde_json::from_str(&text).ok(),
            _ => None,
        }
    }

    #[test]
    fn broadcast_reaches_every_member() {
        let registry = RoomRegistry::new();
        let (host, mut host_rx) = member(RoomRole::Organizer);
        let (player, mut player_rx) = member(RoomRole::Player);
        registry.join("room-1", host);
        registry.join("room-1", player);

        registry.broadcast("room-1", &Ping { seq: 1 });

        assert_eq!(recv_ping(&mut host_rx), Some(Ping { seq: 1 }));
        assert_eq!(recv_ping(&mut player_rx), Some(Ping { seq: 1 }));
    }

    #[test]
    fn broadcast_except_skips_the_sender() {
        let registry = RoomRegistry::new();
        let (host, mut host_rx) = member(RoomRole::Organizer);
        let (player, mut player_rx) = member(RoomRole::Player);
        let sender_id = player.connection_id;
        registry.join("room-1", host);
        registry.join("room-1", player);

        registry.broadcast_except("room-1", sender_id, &Ping { seq: 7 });

        assert_eq!(recv_ping(&mut host_rx), Some(Ping { seq: 7 }));
        assert_eq!(recv_ping(&mut player_rx), None);
    }

    #[test]
    fn rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let (a, mut a_rx) = member(RoomRole::Player);
        let (b, mut b_rx) = member(RoomRole::Player);
        registry.join("room-a", a);
        registry.join("room-b", b);

        registry.broadcast("room-a", &Ping { seq: 3 });

        assert_eq!(recv_ping(&mut a_rx), Some(Ping { seq: 3 }));
        assert_eq!(recv_ping(&mut b_rx), None);
    }

    #[test]
    fn leave_prunes_empty_rooms() {
        let registry = RoomRegistry::new();
        let (a, _a_rx) = member(RoomRole::Player);
        let id = a.connection_id;
        registry.join("room-a", a);
        assert_eq!(registry.member_count("room-a"), 1);

        registry.leave("room-a", id);
        assert_eq!(registry.member_count("room-a"), 0);
        assert!(registry.rooms.get("room-a").is_none());
    }
}
