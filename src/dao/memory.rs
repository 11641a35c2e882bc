//! In-memory [`FahootStore`] used by service unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{
        LogEntity, PlayEntity, PlayerEntity, PodiumEntity, QuizEntity, UserEntity,
        VerificationTokenEntity,
    },
    pagination::{PageRequest, PageResponse, SortOrder},
    store::FahootStore,
    storage::{StorageError, StorageResult},
};

/// Test double holding every collection behind one mutex.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserEntity>,
    quizzes: HashMap<Uuid, QuizEntity>,
    plays: HashMap<Uuid, PlayEntity>,
    players: HashMap<Uuid, PlayerEntity>,
    podiums: HashMap<Uuid, PodiumEntity>,
    tokens: HashMap<Uuid, VerificationTokenEntity>,
    logs: Vec<LogEntity>,
    store_calls: u64,
}

impl MemoryStore {
    /// Fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations that reached the store.
    pub fn call_count(&self) -> u64 {
        self.inner.lock().unwrap().store_calls
    }

    /// Snapshot a user by email.
    pub fn user_by_email(&self, email: &str) -> Option<UserEntity> {
        self.inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    /// Snapshot a play by id.
    pub fn play(&self, id: Uuid) -> Option<PlayEntity> {
        self.inner.lock().unwrap().plays.get(&id).cloned()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    /// Quizzes owned by a user.
    pub fn quizzes_of(&self, owner_id: Uuid) -> Vec<QuizEntity> {
        self.inner
            .lock()
            .unwrap()
            .quizzes
            .values()
            .filter(|quiz| quiz.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Players attached to a play.
    pub fn players_of(&self, play_id: Uuid) -> Vec<PlayerEntity> {
        self.inner
            .lock()
            .unwrap()
            .players
            .values()
            .filter(|player| player.play_id == play_id)
            .cloned()
            .collect()
    }

    /// Podiums attached to a play.
    pub fn podiums_of(&self, play_id: Uuid) -> Vec<PodiumEntity> {
        self.inner
            .lock()
            .unwrap()
            .podiums
            .values()
            .filter(|podium| podium.play_id == play_id)
            .cloned()
            .collect()
    }

    /// Tokens currently stored.
    pub fn tokens(&self) -> Vec<VerificationTokenEntity> {
        self.inner.lock().unwrap().tokens.values().cloned().collect()
    }

    /// Seed a quiz directly.
    pub fn seed_quiz(&self, quiz: QuizEntity) {
        self.inner.lock().unwrap().quizzes.insert(quiz.id, quiz);
    }

    /// Seed a play directly.
    pub fn seed_play(&self, play: PlayEntity) {
        self.inner.lock().unwrap().plays.insert(play.id, play);
    }

    /// Seed a player directly.
    pub fn seed_player(&self, player: PlayerEntity) {
        self.inner.lock().unwrap().players.insert(player.id, player);
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> StorageResult<T>) -> StorageResult<T> {
        let mut inner = self.inner.lock().unwrap();
        inner.store_calls += 1;
        f(&mut inner)
    }
}

fn paginate<T: Clone>(
    mut items: Vec<T>,
    page: &PageRequest,
    sort_key: impl Fn(&T) -> String,
) -> PageResponse<T> {
    items.sort_by_key(|item| sort_key(item));
    if page.sort_order == SortOrder::Desc {
        items.reverse();
    }
    let total = items.len() as u64;
    let results: Vec<T> = items
        .into_iter()
        .skip(page.skip() as usize)
        .take(page.limit() as usize)
        .collect();
    PageResponse::new(results, total, page.page_size)
}

impl FahootStore for MemoryStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner.users.values().any(|u| u.email == user.email) {
                    return Err(StorageError::Duplicate { field: "email" });
                }
                inner.users.insert(user.id, user);
                Ok(())
            })
        })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.users.insert(user.id, user);
                Ok(())
            })
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.with(|inner| Ok(inner.users.get(&id).cloned())) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| Ok(inner.users.values().find(|u| u.email == email).cloned()))
        })
    }

    fn delete_user_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner.users.remove(&id).is_none() {
                    return Ok(false);
                }
                inner.quizzes.retain(|_, quiz| quiz.owner_id != id);
                Ok(true)
            })
        })
    }

    fn save_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.quizzes.insert(quiz.id, quiz);
                Ok(())
            })
        })
    }

    fn find_quiz_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                Ok(inner
                    .quizzes
                    .get(&id)
                    .filter(|quiz| quiz.owner_id == owner_id)
                    .cloned())
            })
        })
    }

    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.with(|inner| Ok(inner.quizzes.get(&id).cloned())) })
    }

    fn delete_quiz(&self, id: Uuid, owner_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                let owned = inner
                    .quizzes
                    .get(&id)
                    .is_some_and(|quiz| quiz.owner_id == owner_id);
                if owned {
                    inner.quizzes.remove(&id);
                }
                Ok(owned)
            })
        })
    }

    fn list_quizzes(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                let needle = page.query.clone().unwrap_or_default().to_lowercase();
                let matching: Vec<QuizEntity> = inner
                    .quizzes
                    .values()
                    .filter(|quiz| quiz.owner_id == owner_id)
                    .filter(|quiz| {
                        needle.is_empty() || quiz.title.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect();
                Ok(paginate(matching, &page, |quiz| quiz.title.clone()))
            })
        })
    }

    fn save_play(&self, play: PlayEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner
                    .plays
                    .values()
                    .any(|p| p.pin == play.pin && p.id != play.id)
                {
                    return Err(StorageError::Duplicate { field: "pin" });
                }
                inner.plays.insert(play.id, play);
                Ok(())
            })
        })
    }

    fn find_play(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.with(|inner| Ok(inner.plays.get(&id).cloned())) })
    }

    fn find_play_by_pin(
        &self,
        pin: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| Ok(inner.plays.values().find(|p| p.pin == pin).cloned()))
        })
    }

    fn list_plays_by_quiz(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                Ok(inner
                    .plays
                    .values()
                    .filter(|play| play.quiz_id == quiz_id)
                    .cloned()
                    .collect())
            })
        })
    }

    fn delete_play_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner.plays.remove(&id).is_none() {
                    return Ok(false);
                }
                inner.players.retain(|_, player| player.play_id != id);
                inner.podiums.retain(|_, podium| podium.play_id != id);
                Ok(true)
            })
        })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner
                    .players
                    .values()
                    .any(|p| p.play_id == player.play_id && p.nickname == player.nickname)
                {
                    return Err(StorageError::Duplicate { field: "nickname" });
                }
                inner.players.insert(player.id, player);
                Ok(())
            })
        })
    }

    fn update_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.players.insert(player.id, player);
                Ok(())
            })
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.with(|inner| Ok(inner.players.get(&id).cloned())) })
    }

    fn list_players(
        &self,
        play_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                let needle = page.query.clone().unwrap_or_default().to_lowercase();
                let matching: Vec<PlayerEntity> = inner
                    .players
                    .values()
                    .filter(|player| player.play_id == play_id)
                    .filter(|player| needle.is_empty() || player.nickname.contains(&needle))
                    .cloned()
                    .collect();
                Ok(paginate(matching, &page, |player| player.nickname.clone()))
            })
        })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.with(|inner| Ok(inner.players.remove(&id).is_some())) })
    }

    fn count_players(&self, play_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                Ok(inner
                    .players
                    .values()
                    .filter(|player| player.play_id == play_id)
                    .count() as u64)
            })
        })
    }

    fn save_podium(&self, podium: PodiumEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.podiums.insert(podium.id, podium);
                Ok(())
            })
        })
    }

    fn find_podium(
        &self,
        play_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PodiumEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                Ok(inner
                    .podiums
                    .values()
                    .find(|podium| podium.play_id == play_id)
                    .cloned())
            })
        })
    }

    fn insert_token(
        &self,
        token: VerificationTokenEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                if inner.tokens.values().any(|t| t.token == token.token) {
                    return Err(StorageError::Duplicate { field: "token" });
                }
                if inner.tokens.values().any(|t| t.email == token.email) {
                    return Err(StorageError::Duplicate { field: "email" });
                }
                inner.tokens.insert(token.id, token);
                Ok(())
            })
        })
    }

    fn consume_token(
        &self,
        token: String,
    ) -> BoxFuture<'static, StorageResult<Option<VerificationTokenEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                let id = inner
                    .tokens
                    .values()
                    .find(|t| t.token == token)
                    .map(|t| t.id);
                Ok(id.and_then(|id| inner.tokens.remove(&id)))
            })
        })
    }

    fn delete_tokens_for_email(&self, email: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.tokens.retain(|_, t| t.email != email);
                Ok(())
            })
        })
    }

    fn append_log(&self, log: LogEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with(|inner| {
                inner.logs.push(log);
                Ok(())
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Fixture builders shared by service tests.
pub mod fixtures {
    use std::time::SystemTime;

    use uuid::Uuid;

    use crate::dao::models::{
        PlayEntity, PlayStatus, PlayerEntity, PlayerStatus, QuizEntity, QuizSettingsEntity,
    };

    /// Draft quiz without questions.
    pub fn quiz(owner_id: Uuid, title: &str) -> QuizEntity {
        let now = SystemTime::now();
        QuizEntity {
            id: Uuid::new_v4(),
            title: title.to_string(),
            owner_id,
            status: crate::dao::models::QuizStatus::Draft,
            questions: Vec::new(),
            settings: QuizSettingsEntity::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Open pending play with the given pin.
    pub fn play(quiz_id: Uuid, organizer_id: Uuid, pin: &str) -> PlayEntity {
        let now = SystemTime::now();
        PlayEntity {
            id: Uuid::new_v4(),
            quiz_id,
            organizer_id,
            name: "Friday session".into(),
            pin: pin.to_string(),
            status: PlayStatus::Pending,
            is_open: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Waiting player with zero points.
    pub fn player(play_id: Uuid, nickname: &str) -> PlayerEntity {
        let now = SystemTime::now();
        PlayerEntity {
            id: Uuid::new_v4(),
            play_id,
            nickname: nickname.to_string(),
            status: PlayerStatus::Waiting,
            points: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
