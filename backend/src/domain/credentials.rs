//! Credential value types validated at construction.

use std::sync::OnceLock;

use regex::Regex;

/// Minimum accepted password length.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Raised when credential material fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The email address was empty or whitespace.
    #[error("email is required")]
    EmptyEmail,
    /// The email address is not syntactically valid.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// The password is shorter than [`PASSWORD_MIN_LEN`].
    #[error("password must be at least {PASSWORD_MIN_LEN} characters")]
    PasswordTooShort,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and wrap an email address. Surrounding whitespace is trimmed
    /// and the address is lowercased.
    ///
    /// # Errors
    /// Returns [`CredentialError::EmptyEmail`] for blank input and
    /// [`CredentialError::InvalidEmail`] when the address fails the syntax
    /// check.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CredentialError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyEmail);
        }
        if !email_pattern().is_match(trimmed) {
            return Err(CredentialError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A password meeting the minimum-length policy.
///
/// The `Debug` representation is redacted so passwords never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate and wrap a password.
    ///
    /// # Errors
    /// Returns [`CredentialError::PasswordTooShort`] when the value has fewer
    /// than [`PASSWORD_MIN_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        if value.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialError::PasswordTooShort);
        }
        Ok(Self(value))
    }

    /// The raw password, for handing to the identity provider.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}
