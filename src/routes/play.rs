//! Play session lifecycle endpoints.
//!
//! Organizer management lives behind the cookie gate; the pin lookup and the
//! play-token lookup are reachable with the API key alone so visitors can
//! find a game before they have any account.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    auth::{
        guard::{ACTIVE_USER, authorize},
        identity::Identity,
    },
    config::PLAY_TOKEN_COOKIE,
    dto::play::{
        CreatePlayRequest, PlayPreviewResponse, PlayResponse, PodiumResponse, UpdatePlayRequest,
    },
    error::AppError,
    services::play_service,
    state::{CookieKey, SharedState},
};

use super::subject;

/// Organizer-facing play endpoints, behind the cookie gate.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/play", post(create_play))
        .route("/play/{id}", get(get_play_by_id))
        .route("/play/{id}", patch(update_play))
        .route("/play/{id}", delete(delete_play))
        .route("/play/{id}/podium", get(get_podium))
        .route("/quiz/{id}/plays", get(list_plays_by_quiz))
}

/// Visitor-facing play lookups, reachable with the API key alone.
pub fn public_router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/play", get(get_own_play))
        .route("/play/pin/{pin}", get(get_play_by_pin))
}

/// Cookie carrying a room token, read back by the socket gateway.
pub(super) fn play_token_cookie(
    state: &SharedState,
    token: String,
) -> Cookie<'static> {
    Cookie::build((PLAY_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.jwt().room_ttl().as_secs() as i64
        ))
        .build()
}

#[utoipa::path(
    post,
    path = "/play",
    tag = "play",
    request_body = CreatePlayRequest,
    responses(
        (status = 201, description = "Play created, organizer room token set as cookie", body = PlayResponse),
        (status = 404, description = "Quiz not found or not owned by the caller"),
    )
)]
/// Start a play session for one of the caller's quizzes. The organizer's
/// room token lands in the play-token cookie for the socket handshake.
pub async fn create_play(
    State(state): State<SharedState>,
    identity: Identity,
    jar: SignedCookieJar<CookieKey>,
    Valid(Json(request)): Valid<Json<CreatePlayRequest>>,
) -> Result<(StatusCode, SignedCookieJar<CookieKey>, Json<PlayResponse>), AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let (play, room_token) = play_service::create_play(&state, subject(&identity)?, request).await?;
    let jar = jar.add(play_token_cookie(&state, room_token));
    Ok((StatusCode::CREATED, jar, Json(play.into())))
}

#[utoipa::path(
    get,
    path = "/play/{id}",
    tag = "play",
    params(("id" = Uuid, Path, description = "Play identifier")),
    responses(
        (status = 200, description = "The play session", body = PlayResponse),
        (status = 404, description = "Not found or not organized by the caller"),
    )
)]
/// Fetch a play the caller organizes.
pub async fn get_play_by_id(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let play = play_service::get_play(&state, subject(&identity)?, id).await?;
    Ok(Json(play.into()))
}

#[utoipa::path(
    get,
    path = "/quiz/{id}/plays",
    tag = "play",
    params(("id" = Uuid, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Every play created for the quiz", body = [PlayResponse]),
        (status = 404, description = "Quiz not found or not owned by the caller"),
    )
)]
/// List every play created for one of the caller's quizzes.
pub async fn list_plays_by_quiz(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayResponse>>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let plays = play_service::list_plays_by_quiz(&state, subject(&identity)?, id).await?;
    Ok(Json(plays.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/play",
    tag = "play",
    responses(
        (status = 200, description = "The play the caller's room token points at", body = PlayPreviewResponse),
        (status = 401, description = "Missing or invalid play token"),
    )
)]
/// Resolve the play the caller's play-token cookie points at. Used by
/// rejoining participants, so it only exposes the preview projection.
pub async fn get_own_play(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
) -> Result<Json<PlayPreviewResponse>, AppError> {
    let token = jar
        .get(PLAY_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing play token".into()))?;
    let claims = state.jwt().verify_room(&token)?;
    let play = play_service::get_play_by_room(&state, &claims.room).await?;
    Ok(Json(play.into()))
}

#[utoipa::path(
    get,
    path = "/play/pin/{pin}",
    tag = "play",
    params(("pin" = String, Path, description = "Six-digit game pin")),
    responses(
        (status = 200, description = "Preview of the matching game", body = PlayPreviewResponse),
        (status = 400, description = "Malformed pin"),
        (status = 404, description = "No game with this pin"),
    )
)]
/// Anonymous pin lookup backing the join screen.
pub async fn get_play_by_pin(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<PlayPreviewResponse>, AppError> {
    let play = play_service::get_play_by_pin(&state, &pin).await?;
    Ok(Json(play.into()))
}

#[utoipa::path(
    patch,
    path = "/play/{id}",
    tag = "play",
    params(("id" = Uuid, Path, description = "Play identifier")),
    request_body = UpdatePlayRequest,
    responses(
        (status = 200, description = "Updated play", body = PlayResponse),
        (status = 404, description = "Not found or not organized by the caller"),
    )
)]
/// Partially update a play; marking it completed freezes the podium.
pub async fn update_play(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<UpdatePlayRequest>>,
) -> Result<Json<PlayResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let play = play_service::update_play(&state, subject(&identity)?, id, request).await?;
    Ok(Json(play.into()))
}

#[utoipa::path(
    get,
    path = "/play/{id}/podium",
    tag = "play",
    params(("id" = Uuid, Path, description = "Play identifier")),
    responses(
        (status = 200, description = "Final standings, winner first", body = PodiumResponse),
        (status = 404, description = "Play not completed yet, or not organized by the caller"),
    )
)]
/// Final standings of a completed play the caller organizes.
pub async fn get_podium(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PodiumResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let podium = play_service::get_podium(&state, subject(&identity)?, id).await?;
    Ok(Json(podium.into()))
}

#[utoipa::path(
    delete,
    path = "/play/{id}",
    tag = "play",
    params(("id" = Uuid, Path, description = "Play identifier")),
    responses(
        (status = 204, description = "Play deleted with its players and podiums"),
        (status = 404, description = "Not found or not organized by the caller"),
    )
)]
/// Delete a play together with its players and podiums.
pub async fn delete_play(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    play_service::delete_play(&state, subject(&identity)?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
