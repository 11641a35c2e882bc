//! DTO definitions for play sessions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{PlayEntity, PlayStatus, PodiumEntity, PodiumRow};

/// Payload starting a new play session for a quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayRequest {
    pub quiz_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Partial update of a play session; the organizer locks or advances it here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub status: Option<PlayStatus>,
    pub is_open: Option<bool>,
}

/// Projection of a play session returned to the organizer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub pin: String,
    pub status: PlayStatus,
    pub is_open: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayEntity> for PlayResponse {
    fn from(play: PlayEntity) -> Self {
        Self {
            id: play.id,
            quiz_id: play.quiz_id,
            organizer_id: play.organizer_id,
            name: play.name,
            pin: play.pin,
            status: play.status,
            is_open: play.is_open,
            created_at: super::format_system_time(play.created_at),
            updated_at: super::format_system_time(play.updated_at),
        }
    }
}

/// Reduced projection returned to anonymous pin lookups; no identifiers that
/// would let a visitor bypass the join flow.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayPreviewResponse {
    pub name: String,
    pub pin: String,
    pub is_open: bool,
}

impl From<PlayEntity> for PlayPreviewResponse {
    fn from(play: PlayEntity) -> Self {
        Self {
            name: play.name,
            pin: play.pin,
            is_open: play.is_open,
        }
    }
}

/// Final standings of a completed play.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodiumResponse {
    pub play_id: Uuid,
    pub rows: Vec<PodiumRow>,
    pub created_at: String,
}

impl From<PodiumEntity> for PodiumResponse {
    fn from(podium: PodiumEntity) -> Self {
        Self {
            play_id: podium.play_id,
            rows: podium.rows,
            created_at: super::format_system_time(podium.created_at),
        }
    }
}
