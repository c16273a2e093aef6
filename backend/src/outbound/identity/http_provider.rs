//! Reqwest-backed implementation of the [`IdentityProvider`] port.
//!
//! This adapter owns transport details only: endpoint construction, auth
//! headers, timeout and status mapping, and JSON decoding into port types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};

use super::dto::{AccountDto, CreateAccountDto, ErrorBodyDto, UpdatePasswordDto};
use crate::domain::credentials::{EmailAddress, Password};
use crate::domain::ports::{Identity, IdentityProvider, IdentityProviderError};
use crate::domain::profile::SubjectId;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProviderSettings {
    /// Base URL of the provider, e.g. `https://auth.campus.example`.
    pub base_url: Url,
    /// Service-role key authorising admin endpoints.
    pub service_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl IdentityProviderSettings {
    /// Settings with the default request timeout.
    #[must_use]
    pub fn new(base_url: Url, service_key: impl Into<String>) -> Self {
        Self {
            base_url,
            service_key: service_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Raised when the adapter cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum IdentitySetupError {
    /// The HTTP client could not be built.
    #[error("identity client construction failed: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL cannot host the provider API paths.
    #[error("identity base URL is not usable: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// HTTP adapter for the identity provider's user and admin endpoints.
pub struct HttpIdentityProvider {
    client: Client,
    user_url: Url,
    admin_users_url: Url,
    service_key: String,
}

impl HttpIdentityProvider {
    /// Build the adapter, precomputing its endpoints.
    ///
    /// # Errors
    /// Returns [`IdentitySetupError`] when the client cannot be constructed
    /// or the base URL cannot be joined with the API paths.
    pub fn new(settings: IdentityProviderSettings) -> Result<Self, IdentitySetupError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let mut base = settings.base_url;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            client,
            user_url: base.join("auth/v1/user")?,
            admin_users_url: base.join("auth/v1/admin/users")?,
            service_key: settings.service_key,
        })
    }

    fn admin_user_url(&self, subject: SubjectId) -> Url {
        let mut url = self.admin_users_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&subject.to_string());
        }
        url
    }

    fn admin_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", self.service_key.as_str())
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.to_string())
}

fn map_verify_status(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IdentityProviderError::unauthorized(),
        _ => IdentityProviderError::transport(ErrorBodyDto::message_or_status(body, status)),
    }
}

fn map_create_status(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let message = ErrorBodyDto::message_or_status(body, status);
    match status {
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
            IdentityProviderError::duplicate_email(message)
        }
        _ => IdentityProviderError::transport(message),
    }
}

fn map_admin_status(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    match status {
        StatusCode::NOT_FOUND => IdentityProviderError::subject_not_found(),
        _ => IdentityProviderError::transport(ErrorBodyDto::message_or_status(body, status)),
    }
}

fn decode_account(body: &[u8]) -> Result<AccountDto, IdentityProviderError> {
    serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::transport(format!("invalid account payload: {error}"))
    })
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityProviderError> {
        let response = self
            .client
            .get(self.user_url.clone())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header("apikey", self.service_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_verify_status(status, body.as_ref()));
        }
        let account = decode_account(body.as_ref())?;
        Ok(Identity {
            subject: SubjectId::from_uuid(account.id),
            email: account.email.unwrap_or_default(),
        })
    }

    async fn create_identity(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<SubjectId, IdentityProviderError> {
        let response = self
            .admin_request(reqwest::Method::POST, self.admin_users_url.clone())
            .json(&CreateAccountDto {
                email: email.as_str(),
                password: password.expose(),
                email_confirm: true,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_create_status(status, body.as_ref()));
        }
        let account = decode_account(body.as_ref())?;
        Ok(SubjectId::from_uuid(account.id))
    }

    async fn delete_identity(&self, subject: SubjectId) -> Result<(), IdentityProviderError> {
        let response = self
            .admin_request(reqwest::Method::DELETE, self.admin_user_url(subject))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_admin_status(status, body.as_ref()))
    }

    async fn update_password(
        &self,
        subject: SubjectId,
        password: &Password,
    ) -> Result<(), IdentityProviderError> {
        let response = self
            .admin_request(reqwest::Method::PUT, self.admin_user_url(subject))
            .json(&UpdatePasswordDto {
                password: password.expose(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_admin_status(status, body.as_ref()))
    }
}
