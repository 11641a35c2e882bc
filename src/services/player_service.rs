//! Participants: joining by pin, lobby management, removal.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    auth::token::RoomRole,
    dao::{
        models::{PlayerEntity, PlayerStatus},
        pagination::{PageRequest, PageResponse},
    },
    dto::{
        player::{JoinPlayRequest, UpdatePlayerRequest},
        validation::{validate_nickname, validate_pin},
    },
    error::ServiceError,
    state::SharedState,
};

fn player_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("player `{id}` not found"))
}

/// Join a play session by pin and mint the player's room token.
///
/// The play must exist and still be open; the nickname is lowercased and must
/// be unique within the play.
pub async fn create_player(
    state: &SharedState,
    request: JoinPlayRequest,
) -> Result<(PlayerEntity, String), ServiceError> {
    validate_pin(&request.pin)
        .map_err(|_| ServiceError::InvalidInput("game pin must be exactly 6 digits".into()))?;
    validate_nickname(&request.nickname)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let store = state.require_store().await?;
    let play = store
        .find_play_by_pin(request.pin.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no game with pin `{}`", request.pin)))?;
    if !play.is_open {
        return Err(ServiceError::InvalidState("game locked".into()));
    }

    let now = SystemTime::now();
    let player = PlayerEntity {
        id: Uuid::new_v4(),
        play_id: play.id,
        nickname: request.nickname.trim().to_lowercase(),
        status: PlayerStatus::Waiting,
        points: 0,
        created_at: now,
        updated_at: now,
    };
    store.insert_player(player.clone()).await?;

    let room_token = state
        .jwt()
        .sign_room(player.id, &play.id.to_string(), RoomRole::Player)?;
    Ok((player, room_token))
}

/// Fetch one participant.
pub async fn get_player(state: &SharedState, id: Uuid) -> Result<PlayerEntity, ServiceError> {
    let store = state.require_store().await?;
    store.find_player(id).await?.ok_or_else(|| player_not_found(id))
}

/// Page through a play's participants, nickname substring filter applied.
pub async fn list_players(
    state: &SharedState,
    play_id: Uuid,
    page: PageRequest,
) -> Result<PageResponse<PlayerEntity>, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_play(play_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("play `{play_id}` not found")))?;
    Ok(store.list_players(play_id, page).await?)
}

/// Apply a partial update to a participant (nickname, status, score).
pub async fn update_player(
    state: &SharedState,
    id: Uuid,
    request: UpdatePlayerRequest,
) -> Result<PlayerEntity, ServiceError> {
    if let Some(nickname) = &request.nickname {
        validate_nickname(nickname)
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    }

    let store = state.require_store().await?;
    let mut player = store.find_player(id).await?.ok_or_else(|| player_not_found(id))?;

    if let Some(nickname) = request.nickname {
        player.nickname = nickname.trim().to_lowercase();
    }
    if let Some(status) = request.status {
        player.status = status;
    }
    if let Some(points) = request.points {
        player.points = points;
    }
    player.updated_at = SystemTime::now();

    store.update_player(player.clone()).await?;
    Ok(player)
}

/// Remove a participant from their play.
pub async fn delete_player(state: &SharedState, id: Uuid) -> Result<PlayerEntity, ServiceError> {
    let store = state.require_store().await?;
    let player = store.find_player(id).await?.ok_or_else(|| player_not_found(id))?;
    if !store.delete_player(id).await? {
        return Err(player_not_found(id));
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::memory::{MemoryStore, fixtures},
        state::test_support::state_with,
    };

    fn join(pin: &str, nickname: &str) -> JoinPlayRequest {
        JoinPlayRequest {
            pin: pin.into(),
            nickname: nickname.into(),
        }
    }

    #[tokio::test]
    async fn join_by_pin_mints_player_room_token() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let play = fixtures::play(Uuid::new_v4(), Uuid::new_v4(), "123456");
        store.seed_play(play.clone());

        let (player, token) = create_player(&state, join("123456", "Alice")).await.unwrap();
        assert_eq!(player.nickname, "alice");
        assert_eq!(player.status, PlayerStatus::Waiting);

        let claims = state.jwt().verify_room(&token).unwrap();
        assert_eq!(claims.sub, player.id);
        assert_eq!(claims.room, play.id.to_string());
        assert_eq!(claims.role, RoomRole::Player);
    }

    #[tokio::test]
    async fn locked_game_rejects_joins() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let mut play = fixtures::play(Uuid::new_v4(), Uuid::new_v4(), "123456");
        play.is_open = false;
        store.seed_play(play.clone());

        let err = create_player(&state, join("123456", "alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(store.players_of(play.id).is_empty());
    }

    #[tokio::test]
    async fn nicknames_are_unique_per_play_after_lowercasing() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let play = fixtures::play(Uuid::new_v4(), Uuid::new_v4(), "123456");
        store.seed_play(play.clone());

        create_player(&state, join("123456", "Alice")).await.unwrap();
        let err = create_player(&state, join("123456", "ALICE")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
        assert_eq!(store.players_of(play.id).len(), 1);
    }

    #[tokio::test]
    async fn malformed_input_short_circuits_before_the_store() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let calls = store.call_count();

        let pin_err = create_player(&state, join("12ab", "alice")).await.unwrap_err();
        assert!(matches!(pin_err, ServiceError::InvalidInput(_)));
        let nick_err = create_player(&state, join("123456", "<nope>")).await.unwrap_err();
        assert!(matches!(nick_err, ServiceError::InvalidInput(_)));
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn delete_player_returns_the_removed_entity() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let play = fixtures::play(Uuid::new_v4(), Uuid::new_v4(), "123456");
        store.seed_play(play.clone());
        let player = fixtures::player(play.id, "alice");
        store.seed_player(player.clone());

        let removed = delete_player(&state, player.id).await.unwrap();
        assert_eq!(removed.id, player.id);
        assert!(store.players_of(play.id).is_empty());
    }
}
