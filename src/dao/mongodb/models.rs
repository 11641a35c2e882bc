//! BSON document representations of the persistent entities.
//!
//! Timestamps are stored as BSON `DateTime`; ids are UUIDs stored as binary
//! (subtype 4) so they index and compare natively.

use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    AuthMethod, LogEntity, LogLevel, LogMeta, PlayEntity, PlayStatus, PlayerEntity, PlayerStatus,
    PodiumEntity, PodiumRow, QuestionEntity, QuizEntity, QuizSettingsEntity, QuizStatus, Role,
    UserEntity, UserStatus, VerificationTokenEntity,
};

/// Encode a UUID as the BSON binary form used for `_id` and reference fields.
pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

/// Filter selecting a document by its UUID `_id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
    password_hash: Option<String>,
    auth_method: AuthMethod,
    avatar_url: Option<String>,
    verified: bool,
    status: UserStatus,
    role: Role,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<UserEntity> for UserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            password_hash: value.password_hash,
            auth_method: value.auth_method,
            avatar_url: value.avatar_url,
            verified: value.verified,
            status: value.status,
            role: value.role,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<UserDocument> for UserEntity {
    fn from(value: UserDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            password_hash: value.password_hash,
            auth_method: value.auth_method,
            avatar_url: value.avatar_url,
            verified: value.verified,
            status: value.status,
            role: value.role,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    title: String,
    owner_id: Uuid,
    status: QuizStatus,
    questions: Vec<QuestionEntity>,
    settings: QuizSettingsEntity,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<QuizEntity> for QuizDocument {
    fn from(value: QuizEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            owner_id: value.owner_id,
            status: value.status,
            questions: value.questions,
            settings: value.settings,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<QuizDocument> for QuizEntity {
    fn from(value: QuizDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            owner_id: value.owner_id,
            status: value.status,
            questions: value.questions,
            settings: value.settings,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    quiz_id: Uuid,
    organizer_id: Uuid,
    name: String,
    pin: String,
    status: PlayStatus,
    is_open: bool,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<PlayEntity> for PlayDocument {
    fn from(value: PlayEntity) -> Self {
        Self {
            id: value.id,
            quiz_id: value.quiz_id,
            organizer_id: value.organizer_id,
            name: value.name,
            pin: value.pin,
            status: value.status,
            is_open: value.is_open,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<PlayDocument> for PlayEntity {
    fn from(value: PlayDocument) -> Self {
        Self {
            id: value.id,
            quiz_id: value.quiz_id,
            organizer_id: value.organizer_id,
            name: value.name,
            pin: value.pin,
            status: value.status,
            is_open: value.is_open,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    play_id: Uuid,
    nickname: String,
    status: PlayerStatus,
    points: u64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<PlayerEntity> for PlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            play_id: value.play_id,
            nickname: value.nickname,
            status: value.status,
            points: value.points,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<PlayerDocument> for PlayerEntity {
    fn from(value: PlayerDocument) -> Self {
        Self {
            id: value.id,
            play_id: value.play_id,
            nickname: value.nickname,
            status: value.status,
            points: value.points,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodiumDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    play_id: Uuid,
    rows: Vec<PodiumRow>,
    created_at: DateTime,
}

impl From<PodiumEntity> for PodiumDocument {
    fn from(value: PodiumEntity) -> Self {
        Self {
            id: value.id,
            play_id: value.play_id,
            rows: value.rows,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<PodiumDocument> for PodiumEntity {
    fn from(value: PodiumDocument) -> Self {
        Self {
            id: value.id,
            play_id: value.play_id,
            rows: value.rows,
            created_at: value.created_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    token: String,
    email: String,
    created_at: DateTime,
}

impl From<VerificationTokenEntity> for TokenDocument {
    fn from(value: VerificationTokenEntity) -> Self {
        Self {
            id: value.id,
            token: value.token,
            email: value.email,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<TokenDocument> for VerificationTokenEntity {
    fn from(value: TokenDocument) -> Self {
        Self {
            id: value.id,
            token: value.token,
            email: value.email,
            created_at: value.created_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    event: String,
    level: LogLevel,
    description: String,
    #[serde(default)]
    meta: LogMeta,
    created_at: DateTime,
}

impl From<LogEntity> for LogDocument {
    fn from(value: LogEntity) -> Self {
        Self {
            id: value.id,
            event: value.event,
            level: value.level,
            description: value.description,
            meta: value.meta,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}
