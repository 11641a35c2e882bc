//! Quiz CRUD, scoped to the authenticated owner.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
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
        quiz::{QuizListItem, QuizResponse, SaveQuizRequest},
    },
    error::AppError,
    services::quiz_service,
    state::SharedState,
};

use super::subject;

/// Quiz endpoints; all require an active, verified account.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/quiz", post(create_quiz))
        .route("/quiz", get(list_quizzes))
        .route("/quiz/{id}", get(get_quiz))
        .route("/quiz/{id}", put(update_quiz))
        .route("/quiz/{id}", delete(delete_quiz))
}

#[utoipa::path(
    post,
    path = "/quiz",
    tag = "quiz",
    request_body = SaveQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizResponse),
        (status = 400, description = "Validation failed"),
    )
)]
/// Create a quiz owned by the caller.
pub async fn create_quiz(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(request)): Valid<Json<SaveQuizRequest>>,
) -> Result<(StatusCode, Json<QuizResponse>), AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let quiz = quiz_service::create_quiz(&state, subject(&identity)?, request).await?;
    Ok((StatusCode::CREATED, Json(quiz.into())))
}

#[utoipa::path(
    get,
    path = "/quiz",
    tag = "quiz",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of the caller's quizzes"),
        (status = 401, description = "Not authenticated"),
    )
)]
/// Page through the caller's quizzes, title substring filter applied.
pub async fn list_quizzes(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Query(query)): Valid<Query<PageQuery>>,
) -> Result<Json<PageResponse<QuizListItem>>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let page = quiz_service::list_quizzes(&state, subject(&identity)?, query.into_request()).await?;
    Ok(Json(page.map(Into::into)))
}

#[utoipa::path(
    get,
    path = "/quiz/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "The quiz", body = QuizResponse),
        (status = 404, description = "Not found or not owned by the caller"),
    )
)]
/// Fetch one of the caller's quizzes.
pub async fn get_quiz(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let quiz = quiz_service::get_quiz(&state, subject(&identity)?, id).await?;
    Ok(Json(quiz.into()))
}

#[utoipa::path(
    put,
    path = "/quiz/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz identifier")),
    request_body = SaveQuizRequest,
    responses(
        (status = 200, description = "Updated quiz", body = QuizResponse),
        (status = 404, description = "Not found or not owned by the caller"),
    )
)]
/// Replace one of the caller's quizzes.
pub async fn update_quiz(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(request)): Valid<Json<SaveQuizRequest>>,
) -> Result<Json<QuizResponse>, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    let quiz = quiz_service::update_quiz(&state, subject(&identity)?, id, request).await?;
    Ok(Json(quiz.into()))
}

#[utoipa::path(
    delete,
    path = "/quiz/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz identifier")),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Not found or not owned by the caller"),
    )
)]
/// Delete one of the caller's quizzes.
pub async fn delete_quiz(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    authorize(&ACTIVE_USER, &identity)?;
    quiz_service::delete_quiz(&state, subject(&identity)?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
