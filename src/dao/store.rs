//! Abstraction over the persistence layer for accounts, quizzes and play
//! sessions. The MongoDB implementation lives in [`crate::dao::mongodb`]; an
//! in-memory implementation backs service unit tests.

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{
        LogEntity, PlayEntity, PlayerEntity, PodiumEntity, QuizEntity, UserEntity,
        VerificationTokenEntity,
    },
    pagination::{PageRequest, PageResponse},
    storage::StorageResult,
};

/// Persistence operations required by the service layer.
///
/// Expected misses are `Option::None`; unique-index collisions are
/// `StorageError::Duplicate`; everything else is an infrastructure failure.
pub trait FahootStore: Send + Sync {
    /// Insert a new user; duplicate email is rejected by the unique index.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing user document.
    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a user by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Fetch a user by lowercased email.
    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Delete a user and every quiz they own inside one transaction.
    ///
    /// Returns `false` when the user does not exist; no quiz is touched in
    /// that case either.
    fn delete_user_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Upsert a quiz document.
    fn save_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a quiz by id and owning user; ownership is part of the filter.
    fn find_quiz_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Fetch a quiz by id regardless of owner.
    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>>;
    /// Delete a quiz owned by the given user. Returns `false` on miss.
    fn delete_quiz(&self, id: Uuid, owner_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Page through a user's quizzes, title substring filter applied.
    fn list_quizzes(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<QuizEntity>>>;

    /// Upsert a play document.
    fn save_play(&self, play: PlayEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a play by id.
    fn find_play(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>>;
    /// Fetch a play by its join pin.
    fn find_play_by_pin(
        &self,
        pin: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>>;
    /// List every play created for a quiz.
    fn list_plays_by_quiz(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayEntity>>>;
    /// Delete a play together with its players and podiums in one transaction.
    fn delete_play_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a new player; duplicate `(play, nickname)` is rejected.
    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing player document.
    fn update_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a player by id.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Page through a play's players, nickname substring filter applied.
    fn list_players(
        &self,
        play_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<PlayerEntity>>>;
    /// Delete a player by id. Returns `false` on miss.
    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Count players attached to a play (podium sizing, room bookkeeping).
    fn count_players(&self, play_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    /// Insert a podium document.
    fn save_podium(&self, podium: PodiumEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch the podium captured for a play, if the play has completed.
    fn find_podium(&self, play_id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<PodiumEntity>>>;

    /// Insert a one-time verification token; token and email are unique.
    fn insert_token(
        &self,
        token: VerificationTokenEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Atomically fetch-and-delete a token by its opaque value.
    fn consume_token(
        &self,
        token: String,
    ) -> BoxFuture<'static, StorageResult<Option<VerificationTokenEntity>>>;
    /// Drop any token previously issued for this email.
    fn delete_tokens_for_email(&self, email: String) -> BoxFuture<'static, StorageResult<()>>;

    /// Append a log document (logs queue consumer).
    fn append_log(&self, log: LogEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
