//! Token verification, role resolution, and the capability gate.
//!
//! Authorisation is a three-step pipeline: extract and verify the bearer
//! token, resolve the caller's role from the profile store, then check the
//! role against the capability's allow-list. The store is never touched
//! before the token has been verified.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    AccessControl, IdentityProvider, IdentityProviderError, ProfileRepository, StaffContext,
};
use crate::domain::profile::Role;

const MISSING_HEADER: &str = "Authorization header is required";
const MISSING_TOKEN: &str = "Bearer token is required";
const INVALID_TOKEN: &str = "Invalid or expired token";
const PROFILE_NOT_FOUND: &str = "User profile not found";

/// A guarded operation with a fixed role allow-list.
///
/// Allow-lists live here, in one table, rather than at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Administer the user directory: list, create, update, delete users.
    ManageUsers,
}

impl Capability {
    /// Roles permitted to exercise this capability. An empty slice permits
    /// any authenticated caller with a profile.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::ManageUsers => &[Role::Administrator],
        }
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// # Errors
/// Unauthorized when the header is absent, lacks the `Bearer ` prefix, or
/// carries an empty token.
pub fn extract_bearer_token(authorization: Option<&str>) -> Result<&str, Error> {
    let header = authorization.ok_or_else(|| Error::unauthorized(MISSING_HEADER))?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized(MISSING_TOKEN))
}

/// Check a resolved role against a capability allow-list.
///
/// # Errors
/// Forbidden, naming the allowed roles, when `role` is outside a non-empty
/// allow-list.
pub fn ensure_permitted(role: Role, allowed: &[Role]) -> Result<(), Error> {
    if allowed.is_empty() || allowed.contains(&role) {
        return Ok(());
    }
    let roles = allowed
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::forbidden(format!(
        "Forbidden: Requires one of these roles: {roles}"
    )))
}

/// [`AccessControl`] implementation over the identity provider and profile
/// store ports.
#[derive(Clone)]
pub struct AccessControlService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AccessControlService {
    /// Wire the service to its outbound ports.
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { identity, profiles }
    }
}

fn map_verification_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::Unauthorized => Error::unauthorized(INVALID_TOKEN),
        other => {
            warn!(error = %other, "token verification failed upstream");
            Error::internal(other.to_string())
        }
    }
}

#[async_trait]
impl AccessControl for AccessControlService {
    async fn authorize(
        &self,
        authorization: Option<&str>,
        capability: Capability,
    ) -> Result<StaffContext, Error> {
        let token = extract_bearer_token(authorization)?;
        let identity = self
            .identity
            .verify_token(token)
            .await
            .map_err(map_verification_error)?;
        let role = self
            .profiles
            .find_role(identity.subject)
            .await
            .map_err(|error| Error::internal(error.to_string()))?
            .ok_or_else(|| Error::unauthorized(PROFILE_NOT_FOUND))?;
        ensure_permitted(role, capability.allowed_roles())?;
        Ok(StaffContext { identity, role })
    }
}
