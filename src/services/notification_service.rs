//! Email notifications dispatched through the notifications queue.
//!
//! Publication is fire and forget; the account flow that triggered the email
//! succeeds even when the broker is briefly unreachable.

use crate::{queue::NotificationMessage, state::SharedState};

/// Queue the verification email sent after sign-up or an email change.
pub fn enqueue_verification(state: &SharedState, email: &str, name: &str, token: &str) {
    enqueue(
        state,
        NotificationMessage::Verification {
            email: email.to_string(),
            name: name.to_string(),
            token: token.to_string(),
        },
    );
}

/// Queue the one-time password reset link.
pub fn enqueue_password_reset(state: &SharedState, email: &str, name: &str, token: &str) {
    enqueue(
        state,
        NotificationMessage::PasswordReset {
            email: email.to_string(),
            name: name.to_string(),
            token: token.to_string(),
        },
    );
}

/// Queue the welcome email sent once an address is verified.
pub fn enqueue_welcome(state: &SharedState, email: &str, name: &str) {
    enqueue(
        state,
        NotificationMessage::Welcome {
            email: email.to_string(),
            name: name.to_string(),
        },
    );
}

fn enqueue(state: &SharedState, message: NotificationMessage) {
    let state = state.clone();
    tokio::spawn(async move {
        let Some(publisher) = state.queue().await else {
            tracing::warn!("notifications queue unavailable, dropping message");
            return;
        };
        if let Err(err) = publisher.publish_notification(&message).await {
            tracing::warn!(error = %err, "failed to publish notification");
        }
    });
}
