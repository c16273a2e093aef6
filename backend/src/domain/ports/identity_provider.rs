//! Driven port for the external identity provider.
//!
//! The identity provider owns credentials (email + password) and token
//! verification. Profile data never lives there; the [`SubjectId`] links the
//! two stores.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::credentials::{EmailAddress, Password};
use crate::domain::ports::macros::define_port_error;
use crate::domain::profile::SubjectId;

/// A verified identity: the token's subject and its registered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject identifier of the account.
    pub subject: SubjectId,
    /// Email address registered with the provider.
    pub email: String,
}

define_port_error! {
    /// Failures surfaced by the identity provider.
    pub enum IdentityProviderError {
        /// The presented token is invalid, expired, or revoked.
        Unauthorized => "token rejected by the identity provider",
        /// An account already exists for the email address.
        DuplicateEmail { message: String } => "{message}",
        /// The subject is not known to the provider.
        SubjectNotFound => "subject not known to the identity provider",
        /// The provider could not be reached or answered unexpectedly.
        Transport { message: String } => "identity provider failure: {message}",
    }
}

/// Operations the domain requires from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token and return the identity it belongs to.
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityProviderError>;

    /// Register a new account and return its subject identifier.
    async fn create_identity(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<SubjectId, IdentityProviderError>;

    /// Permanently remove an account.
    async fn delete_identity(&self, subject: SubjectId) -> Result<(), IdentityProviderError>;

    /// Replace an account's password.
    async fn update_password(
        &self,
        subject: SubjectId,
        password: &Password,
    ) -> Result<(), IdentityProviderError>;
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    accounts: HashMap<SubjectId, String>,
    tokens: HashMap<String, SubjectId>,
}

/// In-memory identity provider for tests and fixture-mode servers.
///
/// Tokens are opaque strings handed out by [`issue_token`]; accounts live in
/// a map keyed by subject. No passwords are checked beyond the policy the
/// [`Password`] type already enforces.
///
/// [`issue_token`]: InMemoryIdentityProvider::issue_token
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    state: Mutex<InMemoryIdentityState>,
}

impl InMemoryIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, InMemoryIdentityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account under a fixed subject.
    pub fn register(&self, subject: SubjectId, email: impl Into<String>) {
        self.state().accounts.insert(subject, email.into());
    }

    /// Associate a bearer token with a registered subject.
    pub fn issue_token(&self, token: impl Into<String>, subject: SubjectId) {
        self.state().tokens.insert(token.into(), subject);
    }

    /// Drop a previously issued token.
    pub fn revoke_token(&self, token: &str) {
        self.state().tokens.remove(token);
    }

    /// True when the subject still has an account.
    #[must_use]
    pub fn has_account(&self, subject: SubjectId) -> bool {
        self.state().accounts.contains_key(&subject)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityProviderError> {
        let state = self.state();
        let subject = *state
            .tokens
            .get(token)
            .ok_or_else(IdentityProviderError::unauthorized)?;
        let email = state
            .accounts
            .get(&subject)
            .cloned()
            .ok_or_else(IdentityProviderError::unauthorized)?;
        Ok(Identity { subject, email })
    }

    async fn create_identity(
        &self,
        email: &EmailAddress,
        _password: &Password,
    ) -> Result<SubjectId, IdentityProviderError> {
        let mut state = self.state();
        if state.accounts.values().any(|known| known == email.as_str()) {
            return Err(IdentityProviderError::duplicate_email(
                "A user with this email address has already been registered",
            ));
        }
        let subject = SubjectId::from_uuid(Uuid::new_v4());
        state.accounts.insert(subject, email.as_str().to_owned());
        Ok(subject)
    }

    async fn delete_identity(&self, subject: SubjectId) -> Result<(), IdentityProviderError> {
        let mut state = self.state();
        if state.accounts.remove(&subject).is_none() {
            return Err(IdentityProviderError::subject_not_found());
        }
        state.tokens.retain(|_, owner| *owner != subject);
        Ok(())
    }

    async fn update_password(
        &self,
        subject: SubjectId,
        _password: &Password,
    ) -> Result<(), IdentityProviderError> {
        if self.state().accounts.contains_key(&subject) {
            Ok(())
        } else {
            Err(IdentityProviderError::subject_not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn subject(n: u128) -> SubjectId {
        SubjectId::from_uuid(Uuid::from_u128(n))
    }

    #[rstest]
    #[tokio::test]
    async fn verify_token_returns_registered_identity() {
        let provider = InMemoryIdentityProvider::new();
        provider.register(subject(1), "admin@campus.example");
        provider.issue_token("token-1", subject(1));

        let identity = provider.verify_token("token-1").await.expect("identity");
        assert_eq!(identity.subject, subject(1));
        assert_eq!(identity.email, "admin@campus.example");
    }

    #[rstest]
    #[tokio::test]
    async fn verify_token_rejects_unknown_and_revoked_tokens() {
        let provider = InMemoryIdentityProvider::new();
        provider.register(subject(1), "admin@campus.example");
        provider.issue_token("token-1", subject(1));
        provider.revoke_token("token-1");

        for token in ["token-1", "never-issued"] {
            let err = provider.verify_token(token).await.expect_err("rejected");
            assert_eq!(err, IdentityProviderError::Unauthorized);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_identity_rejects_duplicate_email() {
        let provider = InMemoryIdentityProvider::new();
        let email = EmailAddress::new("student@campus.example").expect("valid email");
        let password = Password::new("secret-password").expect("valid password");

        provider
            .create_identity(&email, &password)
            .await
            .expect("first registration");
        let err = provider
            .create_identity(&email, &password)
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, IdentityProviderError::DuplicateEmail { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_identity_invalidates_tokens() {
        let provider = InMemoryIdentityProvider::new();
        provider.register(subject(7), "gone@campus.example");
        provider.issue_token("token-7", subject(7));

        provider.delete_identity(subject(7)).await.expect("deleted");
        assert!(!provider.has_account(subject(7)));
        let err = provider
            .verify_token("token-7")
            .await
            .expect_err("token gone");
        assert_eq!(err, IdentityProviderError::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn update_password_requires_known_subject() {
        let provider = InMemoryIdentityProvider::new();
        let password = Password::new("new-secret").expect("valid password");
        let err = provider
            .update_password(subject(9), &password)
            .await
            .expect_err("unknown subject");
        assert_eq!(err, IdentityProviderError::SubjectNotFound);
    }
}
