//! DTO definitions for play participants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{PlayerEntity, PlayerStatus},
    dto::validation::{validate_nickname, validate_pin},
};

/// Payload joining a play session by pin.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinPlayRequest {
    #[validate(custom(function = validate_pin))]
    pub pin: String,
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
}

/// Partial update of a participant.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(custom(function = validate_nickname))]
    pub nickname: Option<String>,
    pub status: Option<PlayerStatus>,
    pub points: Option<u64>,
}

/// Projection of a participant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: Uuid,
    pub play_id: Uuid,
    pub nickname: String,
    pub status: PlayerStatus,
    pub points: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            play_id: player.play_id,
            nickname: player.nickname,
            status: player.status,
            points: player.points,
            created_at: super::format_system_time(player.created_at),
            updated_at: super::format_system_time(player.updated_at),
        }
    }
}
