use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{config::PLAY_TOKEN_COOKIE, services::socket_service, state::{CookieKey, SharedState}};

#[utoipa::path(
    get,
    path = "/ws",
    tag = "ws",
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a room session. The room token comes
/// from the signed play-token cookie set at play creation or join time.
pub async fn ws_handler(
    State(state): State<SharedState>,
    jar: SignedCookieJar<CookieKey>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let play_token = jar
        .get(PLAY_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    ws.on_upgrade(move |socket| socket_service::handle_socket(state, socket, play_token))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}
