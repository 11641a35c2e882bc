//! Messages exchanged over play room WebSockets.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::token::RoomRole,
    dto::{play::PlayPreviewResponse, player::PlayerResponse},
};

/// Messages accepted from room WebSocket clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomInboundMessage {
    /// Organizer closes the room to new joins.
    LockGame,
    /// Organizer ejects a participant.
    RemovePlayer {
        #[serde(rename = "playerId")]
        player_id: Uuid,
    },
    /// Client asks who the server believes it is.
    Identity,
    #[serde(other)]
    Unknown,
}

/// Messages pushed to room WebSocket clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomOutboundMessage {
    /// Handshake acknowledgement after the play token checks out.
    Connected {
        room: String,
        role: RoomRole,
    },
    /// A participant entered the room.
    PlayerJoined { player: PlayerResponse },
    /// The room no longer accepts new joins; carries the updated play.
    LockGame { play: PlayPreviewResponse },
    /// A participant was ejected by the organizer.
    RemovePlayer {
        #[serde(rename = "playerId")]
        player_id: Uuid,
    },
    /// Reply to an identity request.
    Identity {
        subject: Uuid,
        room: String,
        role: RoomRole,
    },
    /// A peer left the room.
    Disconnect { subject: Uuid },
    /// Terminal error; the server closes the socket after sending this.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_unknown_types_are_tolerated() {
        let message: RoomInboundMessage =
            serde_json::from_str(r#"{"type":"time_travel"}"#).unwrap();
        assert!(matches!(message, RoomInboundMessage::Unknown));
    }

    #[test]
    fn remove_player_uses_camel_case_id() {
        let id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"remove_player","playerId":"{id}"}}"#);
        let message: RoomInboundMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(message, RoomInboundMessage::RemovePlayer { player_id } if player_id == id));
    }

    #[test]
    fn outbound_messages_are_tagged() {
        let id = Uuid::new_v4();
        let raw = serde_json::to_string(&RoomOutboundMessage::Disconnect { subject: id }).unwrap();
        assert_eq!(raw, format!(r#"{{"type":"disconnect","subject":"{id}"}}"#));
    }
}
