//! Per-request identity context and the two authentication gates.
//!
//! Every inbound request gets its own [`Identity`] instance stored in the
//! request extensions, never a process-wide value. `require_api_key` checks
//! the shared-secret `Authorization` header and records request metadata;
//! `authenticate` then reads the signed access-token cookie and fills in the
//! subject fields. The socket gateway builds its own `Identity` from a room
//! token instead.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{
    config::ACCESS_TOKEN_COOKIE,
    dao::models::{Role, UserStatus},
    error::AppError,
    state::SharedState,
};

/// Request-scoped identity and metadata holder.
///
/// Populated at most once by the authentication middlewares, read by guards
/// and handlers downstream. Lifetime is the request (or socket connection).
#[derive(Debug, Clone, Default)]
pub struct Identity {
    /// Authenticated subject id.
    pub id: Option<uuid::Uuid>,
    /// Account status carried by the access token.
    pub status: Option<UserStatus>,
    /// Account role carried by the access token.
    pub role: Option<Role>,
    /// Room name, set only for socket sessions.
    pub room: Option<String>,
    /// Email carried by the access token.
    pub email: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// Request host.
    pub hostname: Option<String>,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("missing identity context".into()))
    }
}

/// First gate: the shared API key in the `Authorization: Bearer` header.
///
/// On success a fresh [`Identity`] carrying request metadata is attached to
/// the request; the subject fields stay empty until `authenticate` runs.
pub async fn require_api_key(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|candidate| candidate == state.config().api_key);

    if !authorized {
        return Err(AppError::Unauthorized("invalid API key".into()));
    }

    let headers = request.headers();
    let identity = Identity {
        ip_address: headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(',').next().unwrap_or(value).trim().to_owned()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        hostname: headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        path: Some(request.uri().path().to_owned()),
        ..Identity::default()
    };
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Second gate: the signed `_access_token` cookie.
///
/// Fills the subject fields of the identity created by [`require_api_key`].
pub async fn authenticate(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = SignedCookieJar::from_headers(request.headers(), state.cookie_key().clone());
    let token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::Unauthorized("missing access token".into()))?;

    let claims = state.jwt().verify_session(&token)?;

    let identity = request
        .extensions_mut()
        .get_mut::<Identity>()
        .ok_or_else(|| AppError::Unauthorized("missing identity context".into()))?;
    identity.id = Some(claims.sub);
    identity.email = Some(claims.email);
    identity.role = Some(claims.role);
    identity.status = Some(claims.status);

    Ok(next.run(request).await)
}
