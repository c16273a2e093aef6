//! Driving port for provisioning and maintaining user accounts.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::credentials::{EmailAddress, Password};
use crate::domain::profile::{DeleteMode, NewProfile, Profile, ProfileChanges, Role, SubjectId};

/// Everything needed to provision a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login email registered with the identity provider.
    pub email: EmailAddress,
    /// Initial password.
    pub password: Password,
    /// Profile stored alongside the account.
    pub profile: NewProfile,
}

/// Write-side operations exposed to inbound adapters.
#[async_trait]
pub trait UserProvisioningCommand: Send + Sync {
    /// Create the identity, then its profile row.
    async fn create_user(&self, request: CreateUser) -> Result<Profile, Error>;

    /// Apply a partial profile update.
    async fn update_user(&self, subject: SubjectId, changes: ProfileChanges) -> Result<(), Error>;

    /// Deactivate or permanently remove a user.
    async fn delete_user(&self, subject: SubjectId, mode: DeleteMode) -> Result<(), Error>;

    /// Replace a user's password via the identity provider.
    async fn reset_password(&self, subject: SubjectId, password: Password) -> Result<(), Error>;

    /// Replace a user's role. Idempotent.
    async fn change_role(&self, subject: SubjectId, role: Role) -> Result<(), Error>;
}
