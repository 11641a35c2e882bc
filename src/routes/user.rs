//! Profile management for the authenticated account.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, put},
};
use axum_valid::Valid;

use crate::{
    auth::{
        guard::{ANY_USER, authorize},
        identity::Identity,
    },
    dto::user::{ChangeEmailRequest, ChangePasswordRequest, UpdateUserRequest, UserResponse},
    error::AppError,
    services::user_service,
    state::SharedState,
};

use super::subject;

/// Profile endpoints; every route acts on the cookie-authenticated subject.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/user", get(get_user))
        .route("/user", patch(update_user))
        .route("/user/password", put(change_password))
        .route("/user/email", put(change_email))
        .route("/user", delete(delete_user))
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "user",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
/// Fetch the authenticated user's profile.
pub async fn get_user(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&ANY_USER, &identity)?;
    let user = user_service::get_user(&state, subject(&identity)?).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/user",
    tag = "user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
/// Apply a partial profile update.
pub async fn update_user(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&ANY_USER, &identity)?;
    let user = user_service::update_user(&state, subject(&identity)?, request).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/user/password",
    tag = "user",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = UserResponse),
        (status = 401, description = "Current password does not match"),
    )
)]
/// Rotate the password after verifying the current one.
pub async fn change_password(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(request)): Valid<Json<ChangePasswordRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&ANY_USER, &identity)?;
    let user = user_service::change_password(&state, subject(&identity)?, request).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/user/email",
    tag = "user",
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "Email changed, account back to unverified", body = UserResponse),
        (status = 401, description = "Password does not match"),
        (status = 409, description = "Email already registered"),
    )
)]
/// Change the account email; the account drops back to unverified and a new
/// verification email goes out.
pub async fn change_email(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(request)): Valid<Json<ChangeEmailRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&ANY_USER, &identity)?;
    let user = user_service::change_email(&state, subject(&identity)?, request).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/user",
    tag = "user",
    responses(
        (status = 204, description = "Account and owned data deleted"),
        (status = 401, description = "Not authenticated"),
    )
)]
/// Delete the account together with its quizzes, plays and players.
pub async fn delete_user(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<StatusCode, AppError> {
    authorize(&ANY_USER, &identity)?;
    user_service::delete_user(&state, subject(&identity)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
