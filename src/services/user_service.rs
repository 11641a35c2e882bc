//! Profile management for authenticated users.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    dao::models::{AuthMethod, LogLevel, LogMeta, UserEntity, UserStatus},
    dto::user::{ChangeEmailRequest, ChangePasswordRequest, UpdateUserRequest},
    error::ServiceError,
    services::{auth_service, logger_service},
    state::SharedState,
};

async fn load_user(state: &SharedState, id: Uuid) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))
}

/// Fetch the caller's account.
pub async fn get_user(state: &SharedState, id: Uuid) -> Result<UserEntity, ServiceError> {
    load_user(state, id).await
}

/// Apply a partial profile update.
pub async fn update_user(
    state: &SharedState,
    id: Uuid,
    request: UpdateUserRequest,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let mut user = load_user(state, id).await?;

    if let Some(name) = request.name {
        user.name = name.trim().to_string();
    }
    if let Some(avatar_url) = request.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    user.updated_at = SystemTime::now();

    store.update_user(user.clone()).await?;
    Ok(user)
}

/// Replace the password after checking the current one. OAuth accounts have
/// no password to change.
pub async fn change_password(
    state: &SharedState,
    id: Uuid,
    request: ChangePasswordRequest,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let mut user = load_user(state, id).await?;

    let hash = match (&user.auth_method, &user.password_hash) {
        (AuthMethod::Manual, Some(hash)) => hash.clone(),
        _ => {
            return Err(ServiceError::InvalidState(
                "this account does not use password authentication".into(),
            ));
        }
    };
    if !verify_password(&request.current_password, &hash)? {
        return Err(ServiceError::Unauthorized("wrong password".into()));
    }

    user.password_hash = Some(hash_password(&request.new_password)?);
    user.updated_at = SystemTime::now();
    store.update_user(user.clone()).await?;

    logger_service::emit(
        state,
        "password_changed",
        LogLevel::Info,
        format!("user `{id}` changed their password"),
        LogMeta::default(),
    );
    Ok(user)
}

/// Move the account to a new address. The account drops back to inactive
/// until the new address is verified.
pub async fn change_email(
    state: &SharedState,
    id: Uuid,
    request: ChangeEmailRequest,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let mut user = load_user(state, id).await?;

    let hash = match (&user.auth_method, &user.password_hash) {
        (AuthMethod::Manual, Some(hash)) => hash.clone(),
        _ => {
            return Err(ServiceError::InvalidState(
                "this account does not use password authentication".into(),
            ));
        }
    };
    if !verify_password(&request.password, &hash)? {
        return Err(ServiceError::Unauthorized("wrong password".into()));
    }

    let new_email = request.new_email.trim().to_lowercase();
    if new_email == user.email {
        return Err(ServiceError::InvalidInput(
            "the new email matches the current one".into(),
        ));
    }

    user.email = new_email.clone();
    user.verified = false;
    user.status = UserStatus::Inactive;
    user.updated_at = SystemTime::now();
    store.update_user(user.clone()).await?;

    auth_service::issue_verification(state, &new_email, &user.name).await?;
    Ok(user)
}

/// Delete the account together with every quiz it owns.
pub async fn delete_user(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !store.delete_user_cascade(id).await? {
        return Err(ServiceError::NotFound(format!("user `{id}` not found")));
    }
    logger_service::emit(
        state,
        "user_deleted",
        LogLevel::Info,
        format!("user `{id}` deleted their account"),
        LogMeta::default(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::memory::MemoryStore,
        dto::auth::SignUpRequest,
        state::test_support::state_with,
    };

    async fn signed_up(store: &MemoryStore, state: &SharedState) -> UserEntity {
        auth_service::signup(
            state,
            SignUpRequest {
                name: "Alice".into(),
                email: "a@b.c".into(),
                password: "hunter421".into(),
            },
        )
        .await
        .unwrap();
        store.user_by_email("a@b.c").unwrap()
    }

    #[tokio::test]
    async fn change_email_deactivates_and_reissues_token() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let user = signed_up(&store, &state).await;

        let updated = change_email(
            &state,
            user.id,
            ChangeEmailRequest {
                password: "hunter421".into(),
                new_email: "New@B.c".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.email, "new@b.c");
        assert_eq!(updated.status, UserStatus::Inactive);
        assert!(!updated.verified);
        let tokens = store.tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].email, "new@b.c");
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let user = signed_up(&store, &state).await;

        let err = change_password(
            &state,
            user.id,
            ChangePasswordRequest {
                current_password: "not-it-99".into(),
                new_password: "fresh-pass1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn delete_user_cascades_to_quizzes() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        let user = signed_up(&store, &state).await;
        store.seed_quiz(crate::dao::memory::fixtures::quiz(user.id, "Geography"));
        store.seed_quiz(crate::dao::memory::fixtures::quiz(user.id, "History"));

        delete_user(&state, user.id).await.unwrap();
        assert_eq!(store.user_count(), 0);
        assert!(store.quizzes_of(user.id).is_empty());
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let state = state_with(store).await;
        let err = delete_user(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
