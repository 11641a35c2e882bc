//! Play session lifecycle: creation, pin lookup, locking, teardown.

use std::time::SystemTime;

use rand::Rng;
use uuid::Uuid;

use crate::{
    auth::token::RoomRole,
    dao::{
        models::{LogLevel, LogMeta, PlayEntity, PlayStatus, PodiumEntity, PodiumRow},
        pagination::{PageRequest, SortOrder},
    },
    dto::play::{CreatePlayRequest, UpdatePlayRequest},
    error::ServiceError,
    services::logger_service,
    state::SharedState,
};

/// Attempts at drawing an unused pin before giving up.
const PIN_ATTEMPTS: usize = 16;

fn play_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("play `{id}` not found"))
}

/// Parse a socket room name back into the play id it stands for.
pub fn parse_room(room: &str) -> Result<Uuid, ServiceError> {
    room.parse()
        .map_err(|_| ServiceError::InvalidInput(format!("`{room}` is not a valid room")))
}

/// Start a play session for a quiz the caller owns and mint the organizer's
/// room token.
pub async fn create_play(
    state: &SharedState,
    organizer_id: Uuid,
    request: CreatePlayRequest,
) -> Result<(PlayEntity, String), ServiceError> {
    let store = state.require_store().await?;

    store
        .find_quiz_owned(request.quiz_id, organizer_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{}` not found", request.quiz_id)))?;

    let pin = draw_pin(state).await?;
    let now = SystemTime::now();
    let play = PlayEntity {
        id: Uuid::new_v4(),
        quiz_id: request.quiz_id,
        organizer_id,
        name: request.name.trim().to_string(),
        pin,
        status: PlayStatus::Pending,
        is_open: true,
        created_at: now,
        updated_at: now,
    };
    store.save_play(play.clone()).await?;

    let room_token =
        state
            .jwt()
            .sign_room(organizer_id, &play.id.to_string(), RoomRole::Organizer)?;

    logger_service::emit(
        state,
        "play_created",
        LogLevel::Info,
        format!("play `{}` created for quiz `{}`", play.id, play.quiz_id),
        LogMeta::default(),
    );
    Ok((play, room_token))
}

/// Fetch a play by id; the caller must be its organizer.
pub async fn get_play(
    state: &SharedState,
    organizer_id: Uuid,
    id: Uuid,
) -> Result<PlayEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_play(id)
        .await?
        .filter(|play| play.organizer_id == organizer_id)
        .ok_or_else(|| play_not_found(id))
}

/// Fetch the play a room token points at, regardless of who asks.
pub async fn get_play_by_room(state: &SharedState, room: &str) -> Result<PlayEntity, ServiceError> {
    let id = parse_room(room)?;
    let store = state.require_store().await?;
    store.find_play(id).await?.ok_or_else(|| play_not_found(id))
}

/// Anonymous pin lookup used by the join screen.
pub async fn get_play_by_pin(state: &SharedState, pin: &str) -> Result<PlayEntity, ServiceError> {
    crate::dto::validation::validate_pin(pin)
        .map_err(|_| ServiceError::InvalidInput("game pin must be exactly 6 digits".into()))?;
    let store = state.require_store().await?;
    store
        .find_play_by_pin(pin.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no game with pin `{pin}`")))
}

/// Every play created for a quiz the caller owns.
pub async fn list_plays_by_quiz(
    state: &SharedState,
    organizer_id: Uuid,
    quiz_id: Uuid,
) -> Result<Vec<PlayEntity>, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_quiz_owned(quiz_id, organizer_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("quiz `{quiz_id}` not found")))?;
    Ok(store.list_plays_by_quiz(quiz_id).await?)
}

/// Apply a partial update; this is how the organizer locks or advances the
/// session over REST.
pub async fn update_play(
    state: &SharedState,
    organizer_id: Uuid,
    id: Uuid,
    request: UpdatePlayRequest,
) -> Result<PlayEntity, ServiceError> {
    let store = state.require_store().await?;
    let mut play = store
        .find_play(id)
        .await?
        .filter(|play| play.organizer_id == organizer_id)
        .ok_or_else(|| play_not_found(id))?;

    let was_completed = play.status == PlayStatus::Completed;
    if let Some(name) = request.name {
        play.name = name.trim().to_string();
    }
    if let Some(status) = request.status {
        play.status = status;
    }
    if let Some(is_open) = request.is_open {
        play.is_open = is_open;
    }
    play.updated_at = SystemTime::now();

    store.save_play(play.clone()).await?;

    if play.status == PlayStatus::Completed && !was_completed {
        capture_podium(state, &play).await?;
    }
    Ok(play)
}

/// Freeze the final standings of a completed play, winner first.
async fn capture_podium(state: &SharedState, play: &PlayEntity) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let total = store.count_players(play.id).await?;
    let page = PageRequest {
        page: 1,
        page_size: total.max(1) as i64,
        query: None,
        sort_field: None,
        sort_order: SortOrder::Asc,
    };
    let mut players = store.list_players(play.id, page).await?.results;
    players.sort_by(|a, b| b.points.cmp(&a.points).then(a.nickname.cmp(&b.nickname)));

    let podium = PodiumEntity {
        id: Uuid::new_v4(),
        play_id: play.id,
        rows: players
            .into_iter()
            .map(|player| PodiumRow {
                player_id: player.id,
                nickname: player.nickname,
                points: player.points,
            })
            .collect(),
        created_at: SystemTime::now(),
    };
    store.save_podium(podium).await?;

    logger_service::emit(
        state,
        "play_completed",
        LogLevel::Info,
        format!("play `{}` completed, podium captured", play.id),
        LogMeta::default(),
    );
    Ok(())
}

/// Final standings of a play the caller organized. Only exists once the play
/// has been marked completed.
pub async fn get_podium(
    state: &SharedState,
    organizer_id: Uuid,
    id: Uuid,
) -> Result<PodiumEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_play(id)
        .await?
        .filter(|play| play.organizer_id == organizer_id)
        .ok_or_else(|| play_not_found(id))?;
    store
        .find_podium(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no podium for play `{id}` yet")))
}

/// Close the room to new joins. Called from the socket gateway, where the
/// organizer role was already proven by the room token.
pub async fn lock_play(state: &SharedState, room: &str) -> Result<PlayEntity, ServiceError> {
    let id = parse_room(room)?;
    let store = state.require_store().await?;
    let mut play = store.find_play(id).await?.ok_or_else(|| play_not_found(id))?;

    play.is_open = false;
    play.updated_at = SystemTime::now();
    store.save_play(play.clone()).await?;
    Ok(play)
}

/// Delete a play together with its players and podiums.
pub async fn delete_play(
    state: &SharedState,
    organizer_id: Uuid,
    id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    store
        .find_play(id)
        .await?
        .filter(|play| play.organizer_id == organizer_id)
        .ok_or_else(|| play_not_found(id))?;

    if !store.delete_play_cascade(id).await? {
        return Err(play_not_found(id));
    }
    Ok(())
}

async fn draw_pin(state: &SharedState) -> Result<String, ServiceError> {
    let store = state.require_store().await?;
    for _ in 0..PIN_ATTEMPTS {
        let pin = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        if store.find_play_by_pin(pin.clone()).await?.is_none() {
            return Ok(pin);
        }
    }
    Err(ServiceError::Internal(
        "could not allocate an unused game pin".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::memory::{MemoryStore, fixtures},
        state::test_support::state_with,
    };

    async fn seeded_play(store: &MemoryStore) -> (Uuid, PlayEntity) {
        let organizer = Uuid::new_v4();
        let quiz = fixtures::quiz(organizer, "Maths");
        store.seed_quiz(quiz.clone());
        let play = fixtures::play(quiz.id, organizer, "123456");
        store.seed_play(play.clone());
        (organizer, play)
    }

    #[tokio::test]
    async fn create_play_mints_pin_and_room_token() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let organizer = Uuid::new_v4();
        let quiz = fixtures::quiz(organizer, "Maths");
        store.seed_quiz(quiz.clone());

        let (play, token) = create_play(
            &state,
            organizer,
            CreatePlayRequest {
                quiz_id: quiz.id,
                name: "Friday session".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(play.pin.len(), 6);
        assert!(play.pin.chars().all(|c| c.is_ascii_digit()));
        assert!(play.is_open);
        assert_eq!(play.status, PlayStatus::Pending);

        let claims = state.jwt().verify_room(&token).unwrap();
        assert_eq!(claims.sub, organizer);
        assert_eq!(claims.room, play.id.to_string());
        assert_eq!(claims.role, RoomRole::Organizer);
    }

    #[tokio::test]
    async fn create_play_requires_owned_quiz() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let organizer = Uuid::new_v4();
        let quiz = fixtures::quiz(Uuid::new_v4(), "Not yours");
        store.seed_quiz(quiz.clone());

        let err = create_play(
            &state,
            organizer,
            CreatePlayRequest {
                quiz_id: quiz.id,
                name: "Hijack".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_pin_short_circuits_before_the_store() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let calls = store.call_count();

        let err = get_play_by_pin(&state, "12ab56").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn lock_play_closes_the_room() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let (_, play) = seeded_play(&store).await;

        let locked = lock_play(&state, &play.id.to_string()).await.unwrap();
        assert!(!locked.is_open);
        assert!(!store.play(play.id).unwrap().is_open);
    }

    #[tokio::test]
    async fn delete_play_cascades_players_and_podiums() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let (organizer, play) = seeded_play(&store).await;
        store.seed_player(fixtures::player(play.id, "alice"));
        store.seed_player(fixtures::player(play.id, "bob"));

        delete_play(&state, organizer, play.id).await.unwrap();
        assert!(store.play(play.id).is_none());
        assert!(store.players_of(play.id).is_empty());
        assert!(store.podiums_of(play.id).is_empty());
    }

    #[tokio::test]
    async fn completing_a_play_captures_the_podium_winner_first() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let (organizer, play) = seeded_play(&store).await;
        let mut alice = fixtures::player(play.id, "alice");
        alice.points = 300;
        let mut bob = fixtures::player(play.id, "bob");
        bob.points = 800;
        store.seed_player(alice);
        store.seed_player(bob.clone());

        update_play(
            &state,
            organizer,
            play.id,
            UpdatePlayRequest {
                name: None,
                status: Some(PlayStatus::Completed),
                is_open: None,
            },
        )
        .await
        .unwrap();

        let podium = get_podium(&state, organizer, play.id).await.unwrap();
        assert_eq!(podium.rows.len(), 2);
        assert_eq!(podium.rows[0].player_id, bob.id);
        assert_eq!(podium.rows[0].points, 800);
    }

    #[tokio::test]
    async fn podium_is_absent_until_completion() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let (organizer, play) = seeded_play(&store).await;

        let err = get_podium(&state, organizer, play.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_play_rejects_strangers() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let (_, play) = seeded_play(&store).await;

        let err = update_play(
            &state,
            Uuid::new_v4(),
            play.id,
            UpdatePlayRequest {
                name: None,
                status: None,
                is_open: Some(false),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(store.play(play.id).unwrap().is_open);
    }
}
