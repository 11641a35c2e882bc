//! DTO definitions for the authentication routes.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_password;

/// Payload creating a manual account.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = validate_password))]
    pub password: String,
}

/// Payload for email/password sign-in.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// When set, a long-lived remember-me cookie is issued alongside.
    #[serde(default)]
    pub remember_me: bool,
}

/// Payload carrying a Google identity token for OAuth sign-up or sign-in.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(length(min = 1))]
    pub credential: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Payload consuming a one-time email verification token.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(email)]
    pub email: String,
}

/// Payload asking for a password reset link.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Payload consuming a one-time password reset token.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = validate_password))]
    pub new_password: String,
}
