//! Quiz CRUD, always filtered by the owning user.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::{
        models::{MAX_QUESTIONS, QuizEntity},
        pagination::{PageRequest, PageResponse},
    },
    dto::quiz::SaveQuizRequest,
    error::ServiceError,
    state::SharedState,
};

fn quiz_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("quiz `{id}` not found"))
}

/// Create a quiz owned by the caller.
pub async fn create_quiz(
    state: &SharedState,
    owner_id: Uuid,
    request: SaveQuizRequest,
) -> Result<QuizEntity, ServiceError> {
    let store = state.require_store().await?;
    let now = SystemTime::now();

    let quiz = QuizEntity {
        id: Uuid::new_v4(),
        title: request.title.trim().to_string(),
        owner_id,
        status: request.status,
        questions: build_questions(request.questions)?,
        settings: request.settings.into_entity(),
        created_at: now,
        updated_at: now,
    };
    store.save_quiz(quiz.clone()).await?;
    Ok(quiz)
}

/// Replace a quiz the caller owns.
pub async fn update_quiz(
    state: &SharedState,
    owner_id: Uuid,
    id: Uuid,
    request: SaveQuizRequest,
) -> Result<QuizEntity, ServiceError> {
    let store = state.require_store().await?;

    let mut quiz = store
        .find_quiz_owned(id, owner_id)
        .await?
        .ok_or_else(|| quiz_not_found(id))?;

    quiz.title = request.title.trim().to_string();
    quiz.status = request.status;
    quiz.questions = build_questions(request.questions)?;
    quiz.settings = request.settings.into_entity();
    quiz.updated_at = SystemTime::now();

    store.save_quiz(quiz.clone()).await?;
    Ok(quiz)
}

/// Fetch one quiz the caller owns.
pub async fn get_quiz(
    state: &SharedState,
    owner_id: Uuid,
    id: Uuid,
) -> Result<QuizEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_quiz_owned(id, owner_id)
        .await?
        .ok_or_else(|| quiz_not_found(id))
}

/// Page through the caller's quizzes, title substring filter applied.
pub async fn list_quizzes(
    state: &SharedState,
    owner_id: Uuid,
    page: PageRequest,
) -> Result<PageResponse<QuizEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_quizzes(owner_id, page).await?)
}

/// Delete a quiz the caller owns.
pub async fn delete_quiz(state: &SharedState, owner_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !store.delete_quiz(id, owner_id).await? {
        return Err(quiz_not_found(id));
    }
    Ok(())
}

fn build_questions(
    questions: Vec<crate::dto::quiz::QuestionInput>,
) -> Result<Vec<crate::dao::models::QuestionEntity>, ServiceError> {
    // The DTO validator already rejects oversized payloads; this guards the
    // invariant for callers that bypass the HTTP layer.
    if questions.len() > MAX_QUESTIONS {
        return Err(ServiceError::InvalidInput(format!(
            "a quiz may hold at most {MAX_QUESTIONS} questions"
        )));
    }
    Ok(questions.into_iter().map(|q| q.into_entity()).collect())
}
