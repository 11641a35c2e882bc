//! Wire types exchanged with HTTP and WebSocket clients.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod auth;
pub mod common;
pub mod health;
pub mod play;
pub mod player;
pub mod quiz;
pub mod upload;
pub mod user;
pub mod validation;
pub mod ws;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

pub(crate) fn rfc3339_now() -> String {
    format_system_time(SystemTime::now())
}
