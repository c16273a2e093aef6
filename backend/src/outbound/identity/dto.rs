//! Wire payloads exchanged with the identity provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account payload returned by token verification and admin creation.
#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Admin account-creation request body.
#[derive(Debug, Serialize)]
pub(super) struct CreateAccountDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    /// Admin-created accounts skip the confirmation email.
    pub email_confirm: bool,
}

/// Admin password-replacement request body.
#[derive(Debug, Serialize)]
pub(super) struct UpdatePasswordDto<'a> {
    pub password: &'a str,
}

/// Error body; the provider uses different keys per endpoint generation.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBodyDto {
    /// Best human-readable message in the body, falling back to the status.
    pub(super) fn message_or_status(body: &[u8], status: reqwest::StatusCode) -> String {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|dto| dto.msg.or(dto.message).or(dto.error_description))
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("status {}", status.as_u16()))
    }
}
