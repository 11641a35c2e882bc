//! Centralized logging through the logs queue.
//!
//! Emission is fire and forget: a publish failure is reported on the local
//! tracing output and never bubbles into the request that triggered it.

use crate::{
    auth::identity::Identity,
    dao::models::{LogLevel, LogMeta},
    error::ErrorDetails,
    queue::LogMessage,
    state::SharedState,
};

/// Queue a log message without blocking or failing the caller.
pub fn emit(state: &SharedState, event: &str, level: LogLevel, description: String, meta: LogMeta) {
    let state = state.clone();
    let message = LogMessage {
        event: event.to_string(),
        level,
        description,
        meta,
    };
    tokio::spawn(async move {
        let Some(publisher) = state.queue().await else {
            tracing::warn!(event = %message.event, "logs queue unavailable, dropping message");
            return;
        };
        if let Err(err) = publisher.publish_log(&message).await {
            tracing::warn!(error = %err, event = %message.event, "failed to publish log message");
        }
    });
}

/// Report a failed request, carrying whatever request metadata is known.
pub fn emit_request_failure(
    state: &SharedState,
    details: &ErrorDetails,
    path: &str,
    method: &str,
    identity: Option<&Identity>,
) {
    let meta = LogMeta {
        ip_address: identity.and_then(|identity| identity.ip_address.clone()),
        path: Some(path.to_string()),
        method: Some(method.to_string()),
        user_agent: identity.and_then(|identity| identity.user_agent.clone()),
    };
    emit(
        state,
        "request_failed",
        details.level,
        details.internal_message.clone(),
        meta,
    );
}
