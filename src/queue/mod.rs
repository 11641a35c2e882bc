//! AMQP plumbing for the `logs` and `notifications` queues.
//!
//! Producers fire and forget; consumers run in background tasks, write the
//! side effect first and acknowledge afterwards, so a crash between the two
//! re-delivers the message instead of losing it.

use futures::StreamExt;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::{
    config::AmqpSettings,
    dao::models::{LogEntity, LogLevel, LogMeta},
    mail::Mailer,
    state::SharedState,
};

/// Delay before retrying a message whose side effect failed.
const REDELIVERY_BACKOFF: Duration = Duration::from_secs(1);

/// Body of a message on the logs queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    /// Event name, e.g. `request_failed` or `user_signed_up`.
    pub event: String,
    /// Severity.
    pub level: LogLevel,
    /// Free-text description.
    pub description: String,
    /// Request metadata, when the event happened inside a request.
    #[serde(default)]
    pub meta: LogMeta,
}

/// Body of a message on the notifications queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationMessage {
    /// Ask a new or changed address to prove it is reachable.
    Verification {
        email: String,
        name: String,
        token: String,
    },
    /// Carry a one-time link to choose a new password.
    PasswordReset {
        email: String,
        name: String,
        token: String,
    },
    /// Confirm a completed verification.
    Welcome { email: String, name: String },
}

/// Open AMQP connection plus the queue names it was configured with.
pub struct QueueClient {
    connection: Connection,
    settings: AmqpSettings,
}

/// Cheap handle used by services to publish messages.
pub struct QueuePublisher {
    channel: Channel,
    logs_queue: String,
    notifications_queue: String,
}

/// Connect to the broker. Queue declarations happen per channel.
pub async fn connect(settings: &AmqpSettings) -> Result<QueueClient, lapin::Error> {
    let connection = Connection::connect(&settings.uri, ConnectionProperties::default()).await?;
    Ok(QueueClient {
        connection,
        settings: settings.clone(),
    })
}

async fn open_channel(connection: &Connection, queues: &[&str]) -> Result<Channel, lapin::Error> {
    let channel = connection.create_channel().await?;
    for queue in queues {
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
    }
    Ok(channel)
}

impl QueueClient {
    /// Whether the underlying AMQP connection is still usable.
    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    /// Build the publisher handle stored in the shared state.
    pub async fn publisher(&self) -> Result<QueuePublisher, lapin::Error> {
        let channel = open_channel(
            &self.connection,
            &[
                self.settings.logs_queue.as_str(),
                self.settings.notifications_queue.as_str(),
            ],
        )
        .await?;
        Ok(QueuePublisher {
            channel,
            logs_queue: self.settings.logs_queue.clone(),
            notifications_queue: self.settings.notifications_queue.clone(),
        })
    }

    /// Spawn the background task draining the logs queue into the store.
    pub async fn spawn_log_consumer(&self, state: SharedState) -> Result<(), lapin::Error> {
        let channel = open_channel(&self.connection, &[self.settings.logs_queue.as_str()]).await?;
        let queue = self.settings.logs_queue.clone();
        let mut consumer = channel
            .basic_consume(
                &queue,
                "logs-writer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(err) => {
                        tracing::warn!(error = %err, "logs consumer stream error");
                        continue;
                    }
                };

                let message: LogMessage = match serde_json::from_slice(&delivery.data) {
                    Ok(message) => message,
                    Err(err) => {
                        // Unparseable payloads would loop forever if requeued.
                        tracing::error!(error = %err, "discarding malformed log message");
                        ack(&delivery).await;
                        continue;
                    }
                };

                let Some(store) = state.store().await else {
                    tracing::warn!("store unavailable, requeueing log message");
                    nack_requeue(&delivery).await;
                    tokio::time::sleep(REDELIVERY_BACKOFF).await;
                    continue;
                };

                let entity = LogEntity {
                    id: Uuid::new_v4(),
                    event: message.event,
                    level: message.level,
                    description: message.description,
                    meta: message.meta,
                    created_at: SystemTime::now(),
                };

                match store.append_log(entity).await {
                    Ok(()) => ack(&delivery).await,
                    Err(err) => {
                        tracing::warn!(error = %err, "log write failed, requeueing");
                        nack_requeue(&delivery).await;
                        tokio::time::sleep(REDELIVERY_BACKOFF).await;
                    }
                }
            }
            tracing::warn!("logs consumer stream ended");
        });

        Ok(())
    }

    /// Spawn the background task turning notification messages into emails.
    pub async fn spawn_notification_consumer(
        &self,
        mailer: Mailer,
    ) -> Result<(), lapin::Error> {
        let channel = open_channel(
            &self.connection,
            &[self.settings.notifications_queue.as_str()],
        )
        .await?;
        let queue = self.settings.notifications_queue.clone();
        let mut consumer = channel
            .basic_consume(
                &queue,
                "notifications-mailer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(err) => {
                        tracing::warn!(error = %err, "notifications consumer stream error");
                        continue;
                    }
                };

                let message: NotificationMessage = match serde_json::from_slice(&delivery.data) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::error!(error = %err, "discarding malformed notification");
                        ack(&delivery).await;
                        continue;
                    }
                };

                match mailer.send_notification(&message).await {
                    Ok(()) => ack(&delivery).await,
                    Err(err) => {
                        tracing::warn!(error = %err, "email send failed, requeueing");
                        nack_requeue(&delivery).await;
                        tokio::time::sleep(REDELIVERY_BACKOFF).await;
                    }
                }
            }
            tracing::warn!("notifications consumer stream ended");
        });

        Ok(())
    }
}

async fn ack(delivery: &lapin::message::Delivery) {
    if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
        tracing::warn!(error = %err, "failed to ack delivery");
    }
}

async fn nack_requeue(delivery: &lapin::message::Delivery) {
    let options = BasicNackOptions {
        requeue: true,
        ..Default::default()
    };
    if let Err(err) = delivery.nack(options).await {
        tracing::warn!(error = %err, "failed to nack delivery");
    }
}

impl QueuePublisher {
    /// Publish a log message; persistent delivery, confirmation awaited.
    pub async fn publish_log(&self, message: &LogMessage) -> Result<(), lapin::Error> {
        self.publish(&self.logs_queue, serde_json::to_vec(message)).await
    }

    /// Publish a notification message.
    pub async fn publish_notification(
        &self,
        message: &NotificationMessage,
    ) -> Result<(), lapin::Error> {
        self.publish(&self.notifications_queue, serde_json::to_vec(message))
            .await
    }

    async fn publish(
        &self,
        queue: &str,
        payload: Result<Vec<u8>, serde_json::Error>,
    ) -> Result<(), lapin::Error> {
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                // Serializing our own message types cannot fail in practice.
                tracing::error!(error = %err, "failed to serialize queue message");
                return Ok(());
            }
        };
        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await?
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_messages_round_trip() {
        let message = NotificationMessage::Verification {
            email: "a@b.c".into(),
            name: "Alice".into(),
            token: "tok".into(),
        };
        let raw = serde_json::to_string(&message).unwrap();
        assert!(raw.contains(r#""kind":"verification""#));
        let back: NotificationMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(back, NotificationMessage::Verification { .. }));
    }

    #[test]
    fn log_message_meta_defaults_when_absent() {
        let raw = r#"{"event":"user_signed_up","level":"INFO","description":"ok"}"#;
        let message: LogMessage = serde_json::from_str(raw).unwrap();
        assert!(message.meta.path.is_none());
        assert_eq!(message.level, LogLevel::Info);
    }
}
