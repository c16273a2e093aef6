//! Shared validation helpers for the HTTP adapter.
//!
//! Each helper produces an [`Error::invalid_request`] carrying structured
//! details: the offending field, a stable code, and where safe the rejected
//! value. Password values are never echoed back.

use std::str::FromStr;

use serde_json::json;

use crate::domain::credentials::CredentialError;
use crate::domain::profile::Role;
use crate::domain::{EmailAddress, Error, LanguagePreference, Password};

/// Stable machine-readable codes in validation error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidEmail,
    PasswordTooShort,
    InvalidRole,
    InvalidLanguage,
    EmptyField,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordTooShort => "password_too_short",
            Self::InvalidRole => "invalid_role",
            Self::InvalidLanguage => "invalid_language",
            Self::EmptyField => "empty_field",
        }
    }
}

/// Newtype for HTTP field names appearing in error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: impl Into<String>, code: ValidationCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_error_with_value(
    field: FieldName,
    message: impl Into<String>,
    code: ValidationCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ValidationCode::MissingField,
    )
}

/// Require a present, non-blank string and trim it.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    non_blank(value, field)
}

/// Reject blank strings; trims surrounding whitespace.
pub(crate) fn non_blank(value: String, field: FieldName) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let name = field.as_str();
        return Err(field_error(
            field,
            format!("{name} must not be empty"),
            ValidationCode::EmptyField,
        ));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_email(value: Option<String>, field: FieldName) -> Result<EmailAddress, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    EmailAddress::new(&raw).map_err(|error| match error {
        CredentialError::EmptyEmail => missing_field_error(field),
        _ => field_error_with_value(
            field,
            "email must be a valid address",
            ValidationCode::InvalidEmail,
            &raw,
        ),
    })
}

pub(crate) fn parse_password(value: Option<String>, field: FieldName) -> Result<Password, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    Password::new(raw).map_err(|error| {
        // CredentialError::PasswordTooShort is the only password failure.
        field_error(field, error.to_string(), ValidationCode::PasswordTooShort)
    })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    Role::from_str(value).map_err(|_| {
        field_error_with_value(
            field,
            "role must be one of: student, faculty, administrator",
            ValidationCode::InvalidRole,
            value,
        )
    })
}

pub(crate) fn parse_language(
    value: Option<String>,
    field: FieldName,
) -> Result<LanguagePreference, Error> {
    match value {
        None => Ok(LanguagePreference::default()),
        Some(raw) => LanguagePreference::from_str(&raw).map_err(|_| {
            field_error_with_value(
                field,
                "language_preference must be one of: ar, fr, en",
                ValidationCode::InvalidLanguage,
                &raw,
            )
        }),
    }
}
