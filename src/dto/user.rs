//! DTO definitions for the user routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{AuthMethod, Role, UserEntity, UserStatus},
    dto::validation::validate_password,
};

/// Public projection of a user account; never exposes the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub auth_method: AuthMethod,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub status: UserStatus,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            auth_method: user.auth_method,
            avatar_url: user.avatar_url,
            verified: user.verified,
            status: user.status,
            role: user.role,
            created_at: super::format_system_time(user.created_at),
            updated_at: super::format_system_time(user.updated_at),
        }
    }
}

/// Partial update of the caller's profile.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Password change; the current password must be supplied.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(custom(function = validate_password))]
    pub new_password: String,
}

/// Email change; moves the account back to inactive pending re-verification.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(email)]
    pub new_email: String,
}
