//! Account creation, sign-in and session cookie management.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use axum_valid::Valid;

use crate::{
    config::{ACCESS_TOKEN_COOKIE, REMEMBER_ME_COOKIE},
    dto::{
        auth::{
            ForgotPasswordRequest, GoogleAuthRequest, ResetPasswordRequest, SignInRequest,
            SignUpRequest, VerifyEmailRequest,
        },
        user::UserResponse,
    },
    error::AppError,
    services::auth_service::{self, SessionTokens},
    state::{CookieKey, SharedState},
};

/// Authentication endpoints; these are the only routes that touch cookies.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/authentication/signup", post(signup))
        .route("/authentication/signin", post(signin))
        .route("/authentication/google_signup", post(google_signup))
        .route("/authentication/google_signin", post(google_signin))
        .route("/authentication/auto_login", post(auto_login))
        .route("/authentication/verify_email", post(verify_email))
        .route("/authentication/forgot_password", post(forgot_password))
        .route("/authentication/reset_password", post(reset_password))
        .route("/authentication/logout", post(logout))
        .route("/authentication/remember_me", delete(delete_remember_me))
}

fn session_cookie(name: &'static str, value: String, ttl: std::time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.as_secs() as i64))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

fn apply_tokens(state: &SharedState, jar: SignedCookieJar<CookieKey>, tokens: SessionTokens) -> SignedCookieJar<CookieKey> {
    let jwt = state.jwt();
    let jar = jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access,
        jwt.access_ttl(),
    ));
    match tokens.remember {
        Some(remember) => jar.add(session_cookie(
            REMEMBER_ME_COOKIE,
            remember,
            jwt.remember_ttl(),
        )),
        None => jar,
    }
}

#[utoipa::path(
    post,
    path = "/authentication/signup",
    tag = "authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created, verification email queued", body = UserResponse),
        (status = 409, description = "Email already registered"),
    )
)]
/// Create a manual account; it stays inactive until the email is verified.
pub async fn signup(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<SignUpRequest>>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = auth_service::signup(&state, request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/authentication/signin",
    tag = "authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, session cookies set", body = UserResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
/// Email/password sign-in; sets the access cookie, and the remember-me
/// cookie when requested.
pub async fn signin(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
    Valid(Json(request)): Valid<Json<SignInRequest>>,
) -> Result<(SignedCookieJar<CookieKey>, Json<UserResponse>), AppError> {
    let (user, tokens) = auth_service::signin(&state, request).await?;
    let jar = apply_tokens(&state, jar, tokens);
    Ok((jar, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/authentication/google_signup",
    tag = "authentication",
    request_body = GoogleAuthRequest,
    responses(
        (status = 201, description = "OAuth account created and signed in", body = UserResponse),
        (status = 409, description = "Email already registered"),
    )
)]
/// Create and sign in an OAuth account from a Google credential.
pub async fn google_signup(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
    Valid(Json(request)): Valid<Json<GoogleAuthRequest>>,
) -> Result<(StatusCode, SignedCookieJar<CookieKey>, Json<UserResponse>), AppError> {
    let (user, tokens) = auth_service::google_signup(&state, request).await?;
    let jar = apply_tokens(&state, jar, tokens);
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/authentication/google_signin",
    tag = "authentication",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Signed in, session cookies set", body = UserResponse),
        (status = 401, description = "Unknown or non-OAuth account"),
    )
)]
/// Sign in an existing OAuth account from a Google credential.
pub async fn google_signin(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
    Valid(Json(request)): Valid<Json<GoogleAuthRequest>>,
) -> Result<(SignedCookieJar<CookieKey>, Json<UserResponse>), AppError> {
    let (user, tokens) = auth_service::google_signin(&state, request).await?;
    let jar = apply_tokens(&state, jar, tokens);
    Ok((jar, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/authentication/auto_login",
    tag = "authentication",
    responses(
        (status = 200, description = "Fresh access cookie issued", body = UserResponse),
        (status = 401, description = "Missing or invalid remember-me cookie"),
    )
)]
/// Exchange the remember-me cookie for a fresh access cookie.
pub async fn auto_login(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
) -> Result<(SignedCookieJar<CookieKey>, Json<UserResponse>), AppError> {
    let remember = jar
        .get(REMEMBER_ME_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing remember-me cookie".into()))?;

    let (user, access) = auth_service::auto_login(&state, &remember).await?;
    let jar = jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        access,
        state.jwt().access_ttl(),
    ));
    Ok((jar, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/authentication/verify_email",
    tag = "authentication",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 401, description = "Invalid or expired verification link"),
    )
)]
/// Consume a one-time verification token and activate the account.
pub async fn verify_email(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<VerifyEmailRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service::verify_email(&state, request).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/authentication/forgot_password",
    tag = "authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 204, description = "Reset link queued if the address exists"),
    )
)]
/// Ask for a password reset link. Always answers 204 so the existence of an
/// address cannot be probed.
pub async fn forgot_password(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<ForgotPasswordRequest>>,
) -> Result<StatusCode, AppError> {
    auth_service::forgot_password(&state, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/authentication/reset_password",
    tag = "authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = UserResponse),
        (status = 401, description = "Invalid or expired reset link"),
    )
)]
/// Consume a one-time reset token and set a new password.
pub async fn reset_password(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<ResetPasswordRequest>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service::reset_password(&state, request).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses((status = 204, description = "Session cookies cleared"))
)]
/// Clear both session cookies.
pub async fn logout(jar: SignedCookieJar<CookieKey>) -> (SignedCookieJar<CookieKey>, StatusCode) {
    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REMEMBER_ME_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/authentication/remember_me",
    tag = "authentication",
    responses((status = 204, description = "Remember-me cookie cleared"))
)]
/// Clear only the remember-me cookie.
pub async fn delete_remember_me(jar: SignedCookieJar<CookieKey>) -> (SignedCookieJar<CookieKey>, StatusCode) {
    let jar = jar.remove(removal_cookie(REMEMBER_ME_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}
