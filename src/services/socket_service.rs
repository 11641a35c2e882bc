//! Room WebSocket gateway: authentication, relay loop and teardown.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::token::{RoomClaims, RoomRole},
    dto::{
        player::PlayerResponse,
        ws::{RoomInboundMessage, RoomOutboundMessage},
    },
    services::{play_service, player_service},
    state::{
        SharedState,
        rooms::RoomMember,
        session::{SessionEvent, SessionPhase},
    },
};

/// Handle the full lifecycle of one room WebSocket connection.
///
/// `play_token` is the `_play_token` cookie value captured at upgrade time;
/// authentication happens before the room is ever touched.
pub async fn handle_socket(state: SharedState, socket: WebSocket, play_token: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut phase = SessionPhase::Connecting;

    let claims = match authenticate(&state, play_token.as_deref()) {
        Ok(claims) => {
            phase = advance(phase, SessionEvent::Authenticate);
            claims
        }
        Err(message) => {
            advance(phase, SessionEvent::AuthFailed);
            send_event(&outbound_tx, &RoomOutboundMessage::Error { message });
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let connection_id = Uuid::new_v4();
    let room = claims.room.clone();
    state.rooms().join(
        &room,
        RoomMember {
            connection_id,
            subject: claims.sub,
            role: claims.role,
            tx: outbound_tx.clone(),
        },
    );
    phase = advance(phase, SessionEvent::JoinRoom);
    debug_assert_eq!(phase, SessionPhase::JoinedRoom);

    send_event(
        &outbound_tx,
        &RoomOutboundMessage::Connected {
            room: room.clone(),
            role: claims.role,
        },
    );
    if claims.role == RoomRole::Player {
        announce_join(&state, &claims, connection_id).await;
    }
    info!(room = %room, subject = %claims.sub, role = ?claims.role, "socket joined room");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<RoomInboundMessage>(&text) {
                Ok(inbound) => {
                    handle_inbound(&state, &claims, &outbound_tx, inbound).await;
                }
                Err(err) => {
                    warn!(room = %room, error = %err, "failed to parse room message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(room = %room, error = %err, "websocket error");
                break;
            }
        }
    }

    phase = advance(phase, SessionEvent::Disconnect);
    debug_assert!(phase.is_terminal());

    state.rooms().leave(&room, connection_id);
    state.rooms().broadcast(
        &room,
        &RoomOutboundMessage::Disconnect { subject: claims.sub },
    );
    info!(room = %room, subject = %claims.sub, "socket left room");

    finalize(writer_task, outbound_tx).await;
}

fn authenticate(state: &SharedState, token: Option<&str>) -> Result<RoomClaims, String> {
    let token = token.ok_or_else(|| "missing play token".to_string())?;
    state
        .jwt()
        .verify_room(token)
        .map_err(|_| "invalid or expired play token".to_string())
}

/// Tell everyone already in the room that a player arrived.
async fn announce_join(state: &SharedState, claims: &RoomClaims, connection_id: Uuid) {
    match player_service::get_player(state, claims.sub).await {
        Ok(player) => {
            state.rooms().broadcast_except(
                &claims.room,
                connection_id,
                &RoomOutboundMessage::PlayerJoined {
                    player: PlayerResponse::from(player),
                },
            );
        }
        Err(err) => {
            warn!(room = %claims.room, subject = %claims.sub, error = %err,
                "could not load joining player");
        }
    }
}

async fn handle_inbound(
    state: &SharedState,
    claims: &RoomClaims,
    tx: &mpsc::UnboundedSender<Message>,
    inbound: RoomInboundMessage,
) {
    match inbound {
        RoomInboundMessage::LockGame => {
            if claims.role != RoomRole::Organizer {
                send_event(
                    tx,
                    &RoomOutboundMessage::Error {
                        message: "only the organizer may lock the game".into(),
                    },
                );
                return;
            }
            match play_service::lock_play(state, &claims.room).await {
                Ok(play) => {
                    state.rooms().broadcast(
                        &claims.room,
                        &RoomOutboundMessage::LockGame { play: play.into() },
                    );
                }
                Err(err) => {
                    warn!(room = %claims.room, error = %err, "failed to lock game");
                    send_event(
                        tx,
                        &RoomOutboundMessage::Error {
                            message: "could not lock the game".into(),
                        },
                    );
                }
            }
        }
        RoomInboundMessage::RemovePlayer { player_id } => {
            if claims.role != RoomRole::Organizer {
                send_event(
                    tx,
                    &RoomOutboundMessage::Error {
                        message: "only the organizer may remove players".into(),
                    },
                );
                return;
            }
            match player_service::delete_player(state, player_id).await {
                Ok(_) => {
                    state
                        .rooms()
                        .broadcast(&claims.room, &RoomOutboundMessage::RemovePlayer { player_id });
                }
                Err(err) => {
                    warn!(room = %claims.room, player = %player_id, error = %err,
                        "failed to remove player");
                    send_event(
                        tx,
                        &RoomOutboundMessage::Error {
                            message: "could not remove the player".into(),
                        },
                    );
                }
            }
        }
        RoomInboundMessage::Identity => {
            send_event(
                tx,
                &RoomOutboundMessage::Identity {
                    subject: claims.sub,
                    room: claims.room.clone(),
                    role: claims.role,
                },
            );
        }
        RoomInboundMessage::Unknown => {}
    }
}

/// Serialize and queue an event on one connection; a closed writer only logs.
fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &RoomOutboundMessage) {
    match serde_json::to_string(event) {
        Ok(payload) => {
            let _ = tx.send(Message::Text(payload.into()));
        }
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound event");
        }
    }
}

fn advance(phase: SessionPhase, event: SessionEvent) -> SessionPhase {
    match phase.apply(event) {
        Ok(next) => next,
        Err(err) => {
            warn!(error = %err, "session state machine violation");
            SessionPhase::Disconnected
        }
    }
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_with;
    use crate::dao::memory::MemoryStore;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let state = state_with(MemoryStore::new()).await;
        assert!(authenticate(&state, None).is_err());
    }

    #[tokio::test]
    async fn valid_room_token_yields_claims() {
        let state = state_with(MemoryStore::new()).await;
        let subject = Uuid::new_v4();
        let token = state
            .jwt()
            .sign_room(subject, "room-1", RoomRole::Player)
            .unwrap();

        let claims = authenticate(&state, Some(&token)).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.room, "room-1");
        assert_eq!(claims.role, RoomRole::Player);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let state = state_with(MemoryStore::new()).await;
        let token = state
            .jwt()
            .sign_room(Uuid::new_v4(), "room-1", RoomRole::Player)
            .unwrap();
        let mut tampered = token;
        tampered.push('x');
        assert!(authenticate(&state, Some(&tampered)).is_err());
    }
}
