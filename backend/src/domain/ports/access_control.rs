//! Driving port guarding staff-only operations.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::access::Capability;
use crate::domain::ports::identity_provider::Identity;
use crate::domain::profile::Role;

/// An authenticated caller whose role cleared the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffContext {
    /// Verified identity behind the bearer token.
    pub identity: Identity,
    /// Role resolved from the caller's profile.
    pub role: Role,
}

/// Authenticates a bearer token and gates it against a capability.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Verify the `Authorization` header value and check the caller's role
    /// against `capability`.
    ///
    /// # Errors
    /// Unauthorized when the header or token is missing or invalid, or when
    /// the caller has no profile; forbidden when the role is outside the
    /// capability's allow-list.
    async fn authorize(
        &self,
        authorization: Option<&str>,
        capability: Capability,
    ) -> Result<StaffContext, Error>;
}
