//! Driving port for reading the user directory.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::listing::{ProfileListing, ProfilePage};
use crate::domain::profile::{Profile, SubjectId};

/// Read-side operations exposed to inbound adapters.
#[async_trait]
pub trait UserDirectoryQuery: Send + Sync {
    /// Serve one page of the directory.
    async fn list_users(&self, listing: &ProfileListing) -> Result<ProfilePage, Error>;

    /// Fetch a single user's profile.
    ///
    /// # Errors
    /// Returns a not-found error when no profile exists for the subject.
    async fn fetch_user(&self, subject: SubjectId) -> Result<Profile, Error>;
}
