//! MongoDB implementation of [`FahootStore`].

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::IndexOptions,
};
use uuid::Uuid;

use super::{
    error::{MongoDaoError, MongoResult},
    models::{
        LogDocument, PlayDocument, PlayerDocument, PodiumDocument, QuizDocument, TokenDocument,
        UserDocument, doc_id, uuid_as_binary,
    },
    transaction::{SessionScope, run_in_transaction},
};
use crate::dao::{
    models::{
        LogEntity, PlayEntity, PlayerEntity, PodiumEntity, QuizEntity, UserEntity,
        VerificationTokenEntity,
    },
    pagination::{PageRequest, PageResponse, SortOrder},
    store::FahootStore,
    storage::StorageResult,
};

const USER_COLLECTION: &str = "users";
const QUIZ_COLLECTION: &str = "quizzes";
const PLAY_COLLECTION: &str = "plays";
const PLAYER_COLLECTION: &str = "players";
const PODIUM_COLLECTION: &str = "podiums";
const TOKEN_COLLECTION: &str = "tokens";
const LOG_COLLECTION: &str = "logs";

/// MongoDB-backed store sharing one client across the process.
#[derive(Clone)]
pub struct MongoStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Wrap an established client/database pair.
    pub fn new(client: Client, database: Database) -> Self {
        Self {
            inner: Arc::new(MongoInner { client, database }),
        }
    }

    /// Create every index the application relies on.
    pub async fn ensure_indexes(&self) -> MongoResult<()> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .name(Some(name.to_owned()))
                .unique(Some(true))
                .build()
        };
        let plain = |name: &str| IndexOptions::builder().name(Some(name.to_owned())).build();

        let specs: [(&'static str, Document, IndexOptions, &'static str); 7] = [
            (
                USER_COLLECTION,
                doc! {"email": 1},
                unique("user_email_idx"),
                "email",
            ),
            (
                TOKEN_COLLECTION,
                doc! {"token": 1},
                unique("token_value_idx"),
                "token",
            ),
            (
                TOKEN_COLLECTION,
                doc! {"email": 1},
                unique("token_email_idx"),
                "email",
            ),
            (
                PLAYER_COLLECTION,
                doc! {"play_id": 1, "nickname": 1},
                unique("player_nickname_idx"),
                "play_id,nickname",
            ),
            (
                PLAY_COLLECTION,
                doc! {"pin": 1},
                unique("play_pin_idx"),
                "pin",
            ),
            (
                QUIZ_COLLECTION,
                doc! {"owner_id": 1},
                plain("quiz_owner_idx"),
                "owner_id",
            ),
            (
                PODIUM_COLLECTION,
                doc! {"play_id": 1},
                plain("podium_play_idx"),
                "play_id",
            ),
        ];

        for (collection_name, keys, options, index) in specs {
            let collection = self.inner.database.collection::<Document>(collection_name);
            let model = mongodb::IndexModel::builder()
                .keys(keys)
                .options(options)
                .build();
            collection
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: collection_name,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    fn users(&self) -> Collection<UserDocument> {
        self.inner.database.collection(USER_COLLECTION)
    }

    fn quizzes(&self) -> Collection<QuizDocument> {
        self.inner.database.collection(QUIZ_COLLECTION)
    }

    fn plays(&self) -> Collection<PlayDocument> {
        self.inner.database.collection(PLAY_COLLECTION)
    }

    fn players(&self) -> Collection<PlayerDocument> {
        self.inner.database.collection(PLAYER_COLLECTION)
    }

    fn podiums(&self) -> Collection<PodiumDocument> {
        self.inner.database.collection(PODIUM_COLLECTION)
    }

    fn tokens(&self) -> Collection<TokenDocument> {
        self.inner.database.collection(TOKEN_COLLECTION)
    }

    fn logs(&self) -> Collection<LogDocument> {
        self.inner.database.collection(LOG_COLLECTION)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.inner
            .database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let document: UserDocument = user.into();
        self.users()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::classify_write("user", id, "email", source))?;
        Ok(())
    }

    async fn update_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let document: UserDocument = user.into();
        self.users()
            .replace_one(doc_id(id), &document)
            .await
            .map_err(|source| MongoDaoError::classify_write("user", id, "email", source))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "user",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_user_by_email(&self, email: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .find_one(doc! {"email": email})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "user",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    /// Delete a user and the quizzes they own, atomically.
    async fn delete_user_cascade(&self, id: Uuid) -> MongoResult<bool> {
        let session = self.inner.client.start_session().await.map_err(|source| {
            MongoDaoError::Transaction {
                operation: "session",
                source,
            }
        })?;
        let mut scope = SessionScope::new(session);

        let users = self.users();
        let quizzes = self.quizzes();

        // Scope is dropped (session released) on every exit path below.
        run_in_transaction(&mut scope, move |scope| {
            Box::pin(async move {
                let deleted = users
                    .delete_one(doc_id(id))
                    .session(scope.session_mut())
                    .await
                    .map_err(|source| MongoDaoError::Delete {
                        entity: "user",
                        id,
                        source,
                    })?;

                if deleted.deleted_count == 0 {
                    return Ok(false);
                }

                quizzes
                    .delete_many(doc! {"owner_id": uuid_as_binary(id)})
                    .session(scope.session_mut())
                    .await
                    .map_err(|source| MongoDaoError::Delete {
                        entity: "quiz",
                        id,
                        source,
                    })?;

                Ok(true)
            })
        })
        .await
    }

    async fn save_quiz(&self, quiz: QuizEntity) -> MongoResult<()> {
        let id = quiz.id;
        let document: QuizDocument = quiz.into();
        self.quizzes()
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                entity: "quiz",
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_quiz_filter(&self, filter: Document) -> MongoResult<Option<QuizEntity>> {
        let document =
            self.quizzes()
                .find_one(filter)
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "quiz",
                    source,
                })?;
        Ok(document.map(Into::into))
    }

    async fn delete_quiz(&self, id: Uuid, owner_id: Uuid) -> MongoResult<bool> {
        let result = self
            .quizzes()
            .delete_one(doc! {"_id": uuid_as_binary(id), "owner_id": uuid_as_binary(owner_id)})
            .await
            .map_err(|source| MongoDaoError::Delete {
                entity: "quiz",
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_quizzes(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> MongoResult<PageResponse<QuizEntity>> {
        let mut filter = doc! {"owner_id": uuid_as_binary(owner_id)};
        if let Some(query) = page.query.as_deref().filter(|q| !q.trim().is_empty()) {
            filter.insert(
                "title",
                doc! {"$regex": regex_escape(query), "$options": "i"},
            );
        }

        let total = self
            .quizzes()
            .count_documents(filter.clone())
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "quiz",
                source,
            })?;

        let documents: Vec<QuizDocument> = self
            .quizzes()
            .find(filter)
            .sort(sort_doc(&page, "title", &["title", "created_at", "updated_at"]))
            .skip(page.skip())
            .limit(page.limit())
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "quiz",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "quiz",
                source,
            })?;

        Ok(PageResponse::new(
            documents.into_iter().map(Into::into).collect(),
            total,
            page.page_size,
        ))
    }

    async fn save_play(&self, play: PlayEntity) -> MongoResult<()> {
        let id = play.id;
        let document: PlayDocument = play.into();
        self.plays()
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::classify_write("play", id, "pin", source))?;
        Ok(())
    }

    async fn find_play(&self, id: Uuid) -> MongoResult<Option<PlayEntity>> {
        let document = self
            .plays()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "play",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_play_by_pin(&self, pin: String) -> MongoResult<Option<PlayEntity>> {
        let document = self
            .plays()
            .find_one(doc! {"pin": pin})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "play",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_plays_by_quiz(&self, quiz_id: Uuid) -> MongoResult<Vec<PlayEntity>> {
        let documents: Vec<PlayDocument> = self
            .plays()
            .find(doc! {"quiz_id": uuid_as_binary(quiz_id)})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "play",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "play",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Delete a play together with its players and podiums, atomically.
    async fn delete_play_cascade(&self, id: Uuid) -> MongoResult<bool> {
        let session = self.inner.client.start_session().await.map_err(|source| {
            MongoDaoError::Transaction {
                operation: "session",
                source,
            }
        })?;
        let mut scope = SessionScope::new(session);

        let plays = self.plays();
        let players = self.players();
        let podiums = self.podiums();

        run_in_transaction(&mut scope, move |scope| {
            Box::pin(async move {
                let deleted = plays
                    .delete_one(doc_id(id))
                    .session(scope.session_mut())
                    .await
                    .map_err(|source| MongoDaoError::Delete {
                        entity: "play",
                        id,
                        source,
                    })?;

                if deleted.deleted_count == 0 {
                    return Ok(false);
                }

                players
                    .delete_many(doc! {"play_id": uuid_as_binary(id)})
                    .session(scope.session_mut())
                    .await
                    .map_err(|source| MongoDaoError::Delete {
                        entity: "player",
                        id,
                        source,
                    })?;

                podiums
                    .delete_many(doc! {"play_id": uuid_as_binary(id)})
                    .session(scope.session_mut())
                    .await
                    .map_err(|source| MongoDaoError::Delete {
                        entity: "podium",
                        id,
                        source,
                    })?;

                Ok(true)
            })
        })
        .await
    }

    async fn insert_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id;
        let document: PlayerDocument = player.into();
        self.players()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::classify_write("player", id, "nickname", source))?;
        Ok(())
    }

    async fn update_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id;
        let document: PlayerDocument = player.into();
        self.players()
            .replace_one(doc_id(id), &document)
            .await
            .map_err(|source| MongoDaoError::classify_write("player", id, "nickname", source))?;
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "player",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_players(
        &self,
        play_id: Uuid,
        page: PageRequest,
    ) -> MongoResult<PageResponse<PlayerEntity>> {
        let mut filter = doc! {"play_id": uuid_as_binary(play_id)};
        if let Some(query) = page.query.as_deref().filter(|q| !q.trim().is_empty()) {
            filter.insert(
                "nickname",
                doc! {"$regex": regex_escape(query), "$options": "i"},
            );
        }

        let total = self
            .players()
            .count_documents(filter.clone())
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "player",
                source,
            })?;

        let documents: Vec<PlayerDocument> = self
            .players()
            .find(filter)
            .sort(sort_doc(&page, "nickname", &["nickname", "points", "created_at"]))
            .skip(page.skip())
            .limit(page.limit())
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "player",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "player",
                source,
            })?;

        Ok(PageResponse::new(
            documents.into_iter().map(Into::into).collect(),
            total,
            page.page_size,
        ))
    }

    async fn delete_player(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .players()
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                entity: "player",
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn count_players(&self, play_id: Uuid) -> MongoResult<u64> {
        self.players()
            .count_documents(doc! {"play_id": uuid_as_binary(play_id)})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "player",
                source,
            })
    }

    async fn save_podium(&self, podium: PodiumEntity) -> MongoResult<()> {
        let id = podium.id;
        let document: PodiumDocument = podium.into();
        self.podiums()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Write {
                entity: "podium",
                id,
                source,
            })?;
        Ok(())
    }

    async fn find_podium(&self, play_id: Uuid) -> MongoResult<Option<PodiumEntity>> {
        let document = self
            .podiums()
            .find_one(doc! {"play_id": uuid_as_binary(play_id)})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "podium",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn insert_token(&self, token: VerificationTokenEntity) -> MongoResult<()> {
        let id = token.id;
        let document: TokenDocument = token.into();
        self.tokens()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::classify_write("token", id, "token", source))?;
        Ok(())
    }

    async fn consume_token(&self, token: String) -> MongoResult<Option<VerificationTokenEntity>> {
        let document = self
            .tokens()
            .find_one_and_delete(doc! {"token": token})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "token",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn delete_tokens_for_email(&self, email: String) -> MongoResult<()> {
        self.tokens()
            .delete_many(doc! {"email": email})
            .await
            .map_err(|source| MongoDaoError::Read {
                entity: "token",
                source,
            })?;
        Ok(())
    }

    async fn append_log(&self, log: LogEntity) -> MongoResult<()> {
        let id = log.id;
        let document: LogDocument = log.into();
        self.logs()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::Write {
                entity: "log",
                id,
                source,
            })?;
        Ok(())
    }
}

/// Build the sort document, falling back to the default field when the
/// requested one is not in the whitelist.
fn sort_doc(page: &PageRequest, default_field: &str, allowed: &[&str]) -> Document {
    let field = page
        .sort_field
        .as_deref()
        .filter(|candidate| allowed.contains(candidate))
        .unwrap_or(default_field);
    let direction = match page.sort_order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    doc! {field: direction}
}

/// Escape regex metacharacters so a free-text query only matches literally.
fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl FahootStore for MongoStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.update_user(user).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user_by_email(email).await.map_err(Into::into) })
    }

    fn delete_user_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_user_cascade(id).await.map_err(Into::into) })
    }

    fn save_quiz(&self, quiz: QuizEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_quiz(quiz).await.map_err(Into::into) })
    }

    fn find_quiz_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_quiz_filter(
                    doc! {"_id": uuid_as_binary(id), "owner_id": uuid_as_binary(owner_id)},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_quiz_filter(doc_id(id)).await.map_err(Into::into) })
    }

    fn delete_quiz(&self, id: Uuid, owner_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_quiz(id, owner_id).await.map_err(Into::into) })
    }

    fn list_quizzes(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_quizzes(owner_id, page).await.map_err(Into::into) })
    }

    fn save_play(&self, play: PlayEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_play(play).await.map_err(Into::into) })
    }

    fn find_play(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_play(id).await.map_err(Into::into) })
    }

    fn find_play_by_pin(
        &self,
        pin: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_play_by_pin(pin).await.map_err(Into::into) })
    }

    fn list_plays_by_quiz(
        &self,
        quiz_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_plays_by_quiz(quiz_id).await.map_err(Into::into) })
    }

    fn delete_play_cascade(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_play_cascade(id).await.map_err(Into::into) })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_player(player).await.map_err(Into::into) })
    }

    fn update_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.update_player(player).await.map_err(Into::into) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn list_players(
        &self,
        play_id: Uuid,
        page: PageRequest,
    ) -> BoxFuture<'static, StorageResult<PageResponse<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players(play_id, page).await.map_err(Into::into) })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_player(id).await.map_err(Into::into) })
    }

    fn count_players(&self, play_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_players(play_id).await.map_err(Into::into) })
    }

    fn save_podium(&self, podium: PodiumEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_podium(podium).await.map_err(Into::into) })
    }

    fn find_podium(
        &self,
        play_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PodiumEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_podium(play_id).await.map_err(Into::into) })
    }

    fn insert_token(
        &self,
        token: VerificationTokenEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_token(token).await.map_err(Into::into) })
    }

    fn consume_token(
        &self,
        token: String,
    ) -> BoxFuture<'static, StorageResult<Option<VerificationTokenEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.consume_token(token).await.map_err(Into::into) })
    }

    fn delete_tokens_for_email(&self, email: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_tokens_for_email(email)
                .await
                .map_err(Into::into)
        })
    }

    fn append_log(&self, log: LogEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_log(log).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::pagination::SortOrder;

    fn page(sort_field: Option<&str>, order: SortOrder) -> PageRequest {
        PageRequest {
            page: 1,
            page_size: 10,
            query: None,
            sort_field: sort_field.map(str::to_owned),
            sort_order: order,
        }
    }

    #[test]
    fn regex_escape_neutralizes_metacharacters() {
        assert_eq!(regex_escape("plain"), "plain");
        assert_eq!(regex_escape("a.b"), "a\\.b");
        assert_eq!(regex_escape("(x|y)*"), "\\(x\\|y\\)\\*");
        assert_eq!(regex_escape("100%+"), "100%\\+");
    }

    #[test]
    fn sort_doc_falls_back_on_unknown_field() {
        let doc = sort_doc(
            &page(Some("password_hash"), SortOrder::Asc),
            "title",
            &["title", "created_at"],
        );
        assert_eq!(doc, doc! {"title": 1});
    }

    #[test]
    fn sort_doc_honors_allowed_field_and_direction() {
        let doc = sort_doc(
            &page(Some("created_at"), SortOrder::Desc),
            "title",
            &["title", "created_at"],
        );
        assert_eq!(doc, doc! {"created_at": -1});
    }
}
