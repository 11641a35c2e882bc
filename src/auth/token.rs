//! Signed-token service shared by the REST layer and the socket gateway.
//!
//! One key set signs two payload shapes: session claims for REST calls
//! (`id` + `email` + `role` + `status`) and room claims for play sessions
//! (`id` + `room` + `role`). All verification failures collapse into a single
//! unauthenticated error; callers never distinguish sub-reasons.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    config::JwtSettings,
    dao::models::{Role, UserStatus},
    error::ServiceError,
};

/// Distinguishes short-lived access tokens from long-lived remember-me ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived REST session token.
    Access,
    /// Long-lived remember-me token.
    Remember,
}

/// Role carried by a room-scoped token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomRole {
    /// The host running the play session.
    Organizer,
    /// A participant who joined by pin.
    Player,
}

/// Claims of a REST session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: uuid::Uuid,
    /// Lowercased email address.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Account status at signing time.
    pub status: UserStatus,
    /// Token kind.
    pub kind: TokenKind,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

/// Claims of a room-scoped play token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomClaims {
    /// Subject: the play or player id.
    pub sub: uuid::Uuid,
    /// Room name, the play identifier.
    pub room: String,
    /// Role within the room.
    pub role: RoomRole,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

/// Encoding/decoding keys plus the claims the application validates.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    remember_ttl: Duration,
    room_ttl: Duration,
}

impl JwtKeys {
    /// Derive the key set from validated configuration.
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            access_ttl: settings.access_ttl,
            remember_ttl: settings.remember_ttl,
            room_ttl: settings.room_ttl,
        }
    }

    /// Lifetime of room tokens, exposed so cookie TTLs can match.
    pub fn room_ttl(&self) -> Duration {
        self.room_ttl
    }

    /// Lifetime of access tokens.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Lifetime of remember-me tokens.
    pub fn remember_ttl(&self) -> Duration {
        self.remember_ttl
    }

    /// Sign a REST session token for the given identity.
    pub fn sign_session(
        &self,
        sub: uuid::Uuid,
        email: &str,
        role: Role,
        status: UserStatus,
        kind: TokenKind,
    ) -> Result<String, ServiceError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Remember => self.remember_ttl,
        };
        let (iat, exp) = self.window(ttl);
        let claims = SessionClaims {
            sub,
            email: email.to_owned(),
            role,
            status,
            kind,
            exp,
            iat,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        self.sign(&claims)
    }

    /// Sign a room-scoped token for the socket gateway.
    pub fn sign_room(
        &self,
        sub: uuid::Uuid,
        room: &str,
        role: RoomRole,
    ) -> Result<String, ServiceError> {
        let (iat, exp) = self.window(self.room_ttl);
        let claims = RoomClaims {
            sub,
            room: room.to_owned(),
            role,
            exp,
            iat,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        self.sign(&claims)
    }

    /// Verify a REST session token.
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        self.verify(token)
    }

    /// Verify a REST remember-me token, additionally checking the kind.
    pub fn verify_remember(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        let claims: SessionClaims = self.verify(token)?;
        if claims.kind != TokenKind::Remember {
            return Err(unauthenticated());
        }
        Ok(claims)
    }

    /// Verify a room-scoped play token.
    pub fn verify_room(&self, token: &str) -> Result<RoomClaims, ServiceError> {
        self.verify(token)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ServiceError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|err| ServiceError::Internal(format!("token signing failed: {err}")))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, ServiceError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| unauthenticated())
    }

    fn window(&self, ttl: Duration) -> (u64, u64) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        (now, now + ttl.as_secs())
    }
}

fn unauthenticated() -> ServiceError {
    ServiceError::Unauthorized("invalid or expired token".into())
}
