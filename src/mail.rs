//! Outbound email rendering and SMTP transport.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::{config::SmtpSettings, queue::NotificationMessage};

/// Failures while building or sending an email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP settings or recipient address could not be parsed.
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The message could not be assembled.
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    /// The SMTP relay rejected or dropped the message.
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP client plus the frontend base URL used inside email links.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl Mailer {
    /// Build the transport from validated settings.
    pub fn new(settings: &SmtpSettings, frontend_url: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from: settings.from.parse()?,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Render and send the email for one notification message.
    pub async fn send_notification(&self, message: &NotificationMessage) -> Result<(), MailError> {
        match message {
            NotificationMessage::Verification { email, name, token } => {
                let link = format!(
                    "{}/verify-email?token={token}&email={email}",
                    self.frontend_url
                );
                self.send(
                    email,
                    "Verify your Fahoot email address",
                    format!(
                        "<p>Hi {name},</p>\
                         <p>Confirm your email address to activate your account:</p>\
                         <p><a href=\"{link}\">Verify my email</a></p>\
                         <p>If you did not create this account, you can ignore this email.</p>"
                    ),
                )
                .await
            }
            NotificationMessage::PasswordReset { email, name, token } => {
                let link = format!(
                    "{}/reset-password?token={token}&email={email}",
                    self.frontend_url
                );
                self.send(
                    email,
                    "Reset your Fahoot password",
                    format!(
                        "<p>Hi {name},</p>\
                         <p>Someone asked to reset the password of this account. \
                         The link below is valid once:</p>\
                         <p><a href=\"{link}\">Choose a new password</a></p>\
                         <p>If this was not you, you can ignore this email.</p>"
                    ),
                )
                .await
            }
            NotificationMessage::Welcome { email, name } => {
                self.send(
                    email,
                    "Welcome to Fahoot",
                    format!(
                        "<p>Hi {name},</p>\
                         <p>Your email address is verified and your account is active. \
                         Head over to <a href=\"{}\">Fahoot</a> and create your first quiz.</p>",
                        self.frontend_url
                    ),
                )
                .await
            }
        }
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;
        self.transport.send(email).await?;
        Ok(())
    }
}
