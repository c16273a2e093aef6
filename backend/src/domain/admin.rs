//! User administration service.
//!
//! Implements the directory query and provisioning command ports over the
//! identity provider and profile store. Provisioning is a two-step write:
//! the identity first, then the profile row. A failed second step leaves the
//! identity in place; it is logged and reconciled manually rather than
//! compensated, so a retried create fails loudly on the duplicate email
//! instead of silently rebinding the account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::Error;
use crate::domain::credentials::Password;
use crate::domain::listing::{ProfileListing, ProfilePage};
use crate::domain::ports::{
    CreateUser, IdentityProvider, IdentityProviderError, ProfilePersistenceError,
    ProfileRepository, UserDirectoryQuery, UserProvisioningCommand,
};
use crate::domain::profile::{DeleteMode, Profile, ProfileChanges, Role, SubjectId};

const USER_NOT_FOUND: &str = "User not found";

/// Directory and provisioning operations over the outbound ports.
#[derive(Clone)]
pub struct UserAdminService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl UserAdminService {
    /// Wire the service to its outbound ports.
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { identity, profiles }
    }

    fn require_found(found: bool) -> Result<(), Error> {
        if found {
            Ok(())
        } else {
            Err(Error::not_found(USER_NOT_FOUND))
        }
    }
}

fn map_store_error(error: ProfilePersistenceError) -> Error {
    Error::internal(error.to_string())
}

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::DuplicateEmail { message } => Error::invalid_request(message),
        IdentityProviderError::SubjectNotFound => Error::not_found(USER_NOT_FOUND),
        other => Error::internal(other.to_string()),
    }
}

#[async_trait]
impl UserDirectoryQuery for UserAdminService {
    async fn list_users(&self, listing: &ProfileListing) -> Result<ProfilePage, Error> {
        self.profiles.list(listing).await.map_err(map_store_error)
    }

    async fn fetch_user(&self, subject: SubjectId) -> Result<Profile, Error> {
        self.profiles
            .find_by_subject(subject)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl UserProvisioningCommand for UserAdminService {
    async fn create_user(&self, request: CreateUser) -> Result<Profile, Error> {
        let subject = self
            .identity
            .create_identity(&request.email, &request.password)
            .await
            .map_err(map_provider_error)?;

        match self.profiles.insert(subject, &request.profile).await {
            Ok(profile) => {
                info!(%subject, role = %profile.role, "user provisioned");
                Ok(profile)
            }
            Err(error) => {
                warn!(
                    %subject,
                    error = %error,
                    "profile insert failed after identity creation; orphaned identity needs manual cleanup"
                );
                Err(map_store_error(error))
            }
        }
    }

    async fn update_user(&self, subject: SubjectId, changes: ProfileChanges) -> Result<(), Error> {
        if changes.is_empty() {
            return Err(Error::invalid_request("No updatable fields provided"));
        }
        let found = self
            .profiles
            .update(subject, &changes)
            .await
            .map_err(map_store_error)?;
        Self::require_found(found)
    }

    async fn delete_user(&self, subject: SubjectId, mode: DeleteMode) -> Result<(), Error> {
        match mode {
            DeleteMode::Soft => {
                let found = self
                    .profiles
                    .set_active(subject, false)
                    .await
                    .map_err(map_store_error)?;
                Self::require_found(found)
            }
            DeleteMode::Hard => {
                // Identity first: if this fails nothing has been removed yet.
                self.identity
                    .delete_identity(subject)
                    .await
                    .map_err(map_provider_error)?;
                let removed = self
                    .profiles
                    .delete(subject)
                    .await
                    .map_err(map_store_error)?;
                if !removed {
                    warn!(%subject, "hard delete found no profile row for removed identity");
                }
                Ok(())
            }
        }
    }

    async fn reset_password(&self, subject: SubjectId, password: Password) -> Result<(), Error> {
        self.identity
            .update_password(subject, &password)
            .await
            .map_err(map_provider_error)
    }

    async fn change_role(&self, subject: SubjectId, role: Role) -> Result<(), Error> {
        let found = self
            .profiles
            .update_role(subject, role)
            .await
            .map_err(map_store_error)?;
        Self::require_found(found)
    }
}
