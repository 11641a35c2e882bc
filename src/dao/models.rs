//! Persistent entities stored in MongoDB.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Hard cap on the number of questions a quiz may carry.
pub const MAX_QUESTIONS: usize = 50;

/// How an account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Email + password credentials.
    Manual,
    /// Delegated OAuth identity (no local password).
    OAuth,
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Email verified, full access.
    Active,
    /// Pending email (re-)verification.
    Inactive,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular quiz creator.
    User,
    /// Platform administrator.
    Admin,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Lowercased, unique email address.
    pub email: String,
    /// Argon2 hash; `None` for OAuth accounts.
    pub password_hash: Option<String>,
    /// How the account authenticates.
    pub auth_method: AuthMethod,
    /// Avatar URL, if one was uploaded.
    pub avatar_url: Option<String>,
    /// Whether the email address has been verified.
    pub verified: bool,
    /// Lifecycle status.
    pub status: UserStatus,
    /// Account role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
}

/// Publication status of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    /// Still being edited, not playable.
    Draft,
    /// Visible and playable.
    Published,
}

/// Kind of question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// True/false question.
    Boolean,
    /// Multiple-choice question.
    Choice,
}

/// One answer option embedded in a question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionEntity {
    /// Option text shown to players.
    pub value: String,
    /// Whether picking this option scores.
    pub is_correct: bool,
}

/// A question embedded in a quiz, options included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionEntity {
    /// Question title shown to players.
    pub title: String,
    /// Question kind.
    pub kind: QuestionKind,
    /// Candidate answers.
    pub options: Vec<OptionEntity>,
    /// Seconds players have to answer.
    pub duration_secs: u32,
    /// Points awarded for a correct answer.
    pub points: u32,
    /// Optional image/video URL displayed with the question.
    pub media_url: Option<String>,
}

/// Per-quiz cosmetic settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuizSettingsEntity {
    /// Music played in the lobby.
    pub lobby_music_url: Option<String>,
    /// Music played on the podium screen.
    pub podium_music_url: Option<String>,
    /// Music played during questions.
    pub game_music_url: Option<String>,
    /// Color label used by the frontend.
    pub color_label: Option<String>,
}

/// A quiz owned by a user, questions embedded in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Quiz title.
    pub title: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Publication status.
    pub status: QuizStatus,
    /// Ordered questions; never more than [`MAX_QUESTIONS`].
    pub questions: Vec<QuestionEntity>,
    /// Cosmetic settings.
    pub settings: QuizSettingsEntity,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
}

/// Lifecycle of one play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    /// Created, waiting for players.
    Pending,
    /// Questions are being played.
    Active,
    /// Finished.
    Completed,
}

/// One instance of running a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEntity {
    /// Unique identifier; doubles as the socket room name.
    pub id: Uuid,
    /// Quiz being played.
    pub quiz_id: Uuid,
    /// Organizing user.
    pub organizer_id: Uuid,
    /// Human-readable session name.
    pub name: String,
    /// Six-digit join code.
    pub pin: String,
    /// Lifecycle status.
    pub status: PlayStatus,
    /// Whether new players may still join.
    pub is_open: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
}

/// Participant lifecycle within a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Joined, waiting in the lobby.
    Waiting,
    /// Actively answering questions.
    Playing,
    /// Removed by the organizer.
    Removed,
}

/// Ephemeral per-session participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Play the participant belongs to.
    pub play_id: Uuid,
    /// Lowercased nickname, unique within the play.
    pub nickname: String,
    /// Participant status.
    pub status: PlayerStatus,
    /// Accumulated points.
    pub points: u64,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
}

/// One ranked row on a podium.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PodiumRow {
    /// Player identifier.
    pub player_id: Uuid,
    /// Nickname at the time the podium was written.
    pub nickname: String,
    /// Final score.
    pub points: u64,
}

/// Final standings captured for a play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodiumEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Play the podium belongs to.
    pub play_id: Uuid,
    /// Ranked rows, winner first.
    pub rows: Vec<PodiumRow>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// One-time token for email verification or password reset, consumed on use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationTokenEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Opaque token value, unique.
    pub token: String,
    /// Email the token was issued for, unique.
    pub email: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Severity attached to a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Normal business event.
    Info,
    /// Suspicious but handled.
    Warn,
    /// Fault requiring attention.
    Critical,
}

/// Request metadata captured alongside a log entry, when available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogMeta {
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// Request method.
    pub method: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Append-only log document written by the logs queue consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntity {
    /// Unique identifier.
    pub id: Uuid,
    /// Event name.
    pub event: String,
    /// Severity.
    pub level: LogLevel,
    /// Free-text description.
    pub description: String,
    /// Request metadata, when the failure happened inside a request.
    #[serde(default)]
    pub meta: LogMeta,
    /// Creation timestamp.
    pub created_at: SystemTime,
}
