//! Participant endpoints.
//!
//! Joining is anonymous (API key only); everything else is reserved for the
//! organizer of the play the participant belongs to.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    auth::{
        guard::{ACTIVE_USER, authorize},
        identity::Identity,
    },
    dao::pagination::PageResponse,
    dto::{
        common::PageQuery,
        player::{JoinPlayRequest, PlayerResponse, UpdatePlayerRequest},
    },
    error::AppError,
    services::{play_service, player_service},
    state::{CookieKey, SharedState},
};

use super::{play::play_token_cookie, subject};

/// Organizer-facing participant management, behind the cookie gate.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/player/{id}", get(get_player))
        .route("/player/{id}", patch(update_player))
        .route("/player/{id}", delete(delete_player))
        .route("/play/{id}/players", get(list_players))
}

/// The anonymous join endpoint, reachable with the API key alone.
pub fn public_router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/player", post(create_player))
}

/// Resolve the player and check the caller organizes its play.
async fn organized_player(
    state: &SharedState,
    identity: &Identity,
    player_id: Uuid,
) -> Result<crate::dao::models::PlayerEntity, AppError> {
    let player = player_service::get_player(state, player_id).await?;
    play_service::get_play(state, subject(identity)?, player.play_id).await?;
    Ok(player)
}

#[utoipa::path(
    post,
    path = "/player",
    tag = "player",
    request_body = JoinPlayRequest,
    responses(
        (status = 201, description = "Joined; player room token set as cookie", body = PlayerResponse),
        (status = 404, description = "No game with this pin"),
        (status = 409, description = "Game locked, or nickname already taken"),
    )
)]
/// Join an open game by pin. The player's room token lands in the play-token
/// cookie for the socket handshake.
pub async fn create_player(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
    Valid(Json(request)): Valid<Json<JoinPlayRequest>>,
) -> Result<(StatusCode, SignedCookieJar<CookieKey>, Json<PlayerResponse>), AppError> {
    let (player, room_token) = player_service::create_player(&state, request).await?;
    let jar = jar.add(play_token_cookie(&state, room_token));
    Ok((StatusCode::CREATED, jar, Json(player.into())))
}

#[utoipa::path(
    get,
    path = "/player/{id}",
    tag = "player",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "The participant", body = PlayerResponse),
        (status = 404, description = "Not found or not in a play the caller organizes"),
    )
)]
/// Fetch a participant of a play the caller organizes.
pub async fn get_player(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let player = organized_player(&state, &identity, id).await?;
    Ok(Json(player.into()))
}

#[utoipa::path(
    get,
    path = "/play/{id}/players",
    tag = "player",
    params(
        ("id" = Uuid, Path, description = "Play identifier"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Page of the play's participants"),
        (status = 404, description = "Play not found or not organized by the caller"),
    )
)]
/// Page through the participants of a play the caller organizes.
pub async fn list_players(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Query(query)): Valid<Query<PageQuery>>,
) -> Result<Json<PageResponse<PlayerResponse>>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    play_service::get_play(&state, subject(&identity)?, id).await?;
    let page = player_service::list_players(&state, id, query.into_request()).await?;
    Ok(Json(page.map(Into::into)))
}

#[utoipa::path(
    patch,
    path = "/player/{id}",
    tag = "player",
    params(("id" = Uuid, Path, description = "Player identifier")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Updated participant", body = PlayerResponse),
        (status = 404, description = "Not found or not in a play the caller organizes"),
    )
)]
/// Update a participant; this is how the organizer awards points.
pub async fn update_player(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<UpdatePlayerRequest>>,
) -> Result<Json<PlayerResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    organized_player(&state, &identity, id).await?;
    let player = player_service::update_player(&state, id, request).await?;
    Ok(Json(player.into()))
}

#[utoipa::path(
    delete,
    path = "/player/{id}",
    tag = "player",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Removed participant", body = PlayerResponse),
        (status = 404, description = "Not found or not in a play the caller organizes"),
    )
)]
/// Remove a participant from a play the caller organizes.
pub async fn delete_player(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    organized_player(&state, &identity, id).await?;
    let removed = player_service::delete_player(&state, id).await?;
    Ok(Json(removed.into()))
}
