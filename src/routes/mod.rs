//! Route trees and the gate layering that protects them.
//!
//! Three concentric zones: health, docs and the socket upgrade are open;
//! everything else sits behind the API key; account and management routes
//! additionally require the signed access-token cookie.

use axum::{Router, middleware::from_fn_with_state};
use uuid::Uuid;

use crate::{
    auth::identity::{self, Identity},
    error::{self, AppError},
    state::SharedState,
    throttle,
};

pub mod authentication;
pub mod docs;
pub mod health;
pub mod play;
pub mod player;
pub mod quiz;
pub mod upload;
pub mod user;
pub mod websocket;

/// Pull the authenticated subject id out of an identity.
pub(crate) fn subject(identity: &Identity) -> Result<Uuid, AppError> {
    identity
        .id
        .ok_or_else(|| AppError::Unauthorized("missing subject".into()))
}

/// Compose all route trees, wiring in shared state and the gate layers.
pub fn router(state: SharedState) -> Router<()> {
    let cookie_gated = user::router()
        .merge(quiz::router())
        .merge(play::router())
        .merge(player::router())
        .merge(upload::router())
        .layer(from_fn_with_state(state.clone(), identity::authenticate));

    let api_key_gated = authentication::router()
        .merge(play::public_router())
        .merge(player::public_router())
        .merge(cookie_gated)
        .layer(from_fn_with_state(state.clone(), identity::require_api_key));

    let api_router = api_key_gated
        .merge(health::router())
        .merge(websocket::router())
        .layer(from_fn_with_state(state.clone(), throttle::throttle))
        .layer(from_fn_with_state(state.clone(), error::error_envelope));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
