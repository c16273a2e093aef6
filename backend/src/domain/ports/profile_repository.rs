//! Driven port for the profile store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::listing::{ProfileListing, ProfilePage};
use crate::domain::ports::macros::define_port_error;
use crate::domain::profile::{NewProfile, Profile, ProfileChanges, Role, SubjectId};

define_port_error! {
    /// Failures surfaced by the profile store.
    pub enum ProfilePersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "profile store connection failure: {message}",
        /// A statement failed to execute.
        Query { message: String } => "profile store query failure: {message}",
    }
}

/// Operations the domain requires from the profile store.
///
/// Mutating operations return `false` when no row exists for the subject so
/// callers can produce their own not-found errors.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a profile row for a freshly created subject.
    async fn insert(
        &self,
        subject: SubjectId,
        profile: &NewProfile,
    ) -> Result<Profile, ProfilePersistenceError>;

    /// Fetch the profile belonging to a subject.
    async fn find_by_subject(
        &self,
        subject: SubjectId,
    ) -> Result<Option<Profile>, ProfilePersistenceError>;

    /// Fetch just the role of a subject's profile.
    async fn find_role(&self, subject: SubjectId) -> Result<Option<Role>, ProfilePersistenceError>;

    /// Serve one page of the directory.
    async fn list(&self, listing: &ProfileListing) -> Result<ProfilePage, ProfilePersistenceError>;

    /// Apply a partial update to a subject's profile.
    async fn update(
        &self,
        subject: SubjectId,
        changes: &ProfileChanges,
    ) -> Result<bool, ProfilePersistenceError>;

    /// Flip the active flag on a subject's profile.
    async fn set_active(
        &self,
        subject: SubjectId,
        active: bool,
    ) -> Result<bool, ProfilePersistenceError>;

    /// Replace the role on a subject's profile.
    async fn update_role(
        &self,
        subject: SubjectId,
        role: Role,
    ) -> Result<bool, ProfilePersistenceError>;

    /// Remove a subject's profile row.
    async fn delete(&self, subject: SubjectId) -> Result<bool, ProfilePersistenceError>;
}

/// In-memory profile store for tests and fixture-mode servers.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn profiles(&self) -> std::sync::MutexGuard<'_, Vec<Profile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the store with an existing profile.
    pub fn seed(&self, profile: Profile) {
        self.profiles().push(profile);
    }

    fn apply_changes(profile: &mut Profile, changes: &ProfileChanges) {
        if let Some(first_name) = &changes.first_name {
            profile.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            profile.last_name.clone_from(last_name);
        }
        if let Some(department) = &changes.department {
            profile.department = Some(department.clone());
        }
        if let Some(student_id) = &changes.student_id {
            profile.student_id = Some(student_id.clone());
        }
        if let Some(faculty_id) = &changes.faculty_id {
            profile.faculty_id = Some(faculty_id.clone());
        }
        if let Some(bio) = &changes.bio {
            profile.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &changes.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(language) = changes.language_preference {
            profile.language_preference = language;
        }
        profile.updated_at = Utc::now();
    }

    fn mutate<F>(&self, subject: SubjectId, apply: F) -> bool
    where
        F: FnOnce(&mut Profile),
    {
        let mut profiles = self.profiles();
        match profiles.iter_mut().find(|p| p.subject == subject) {
            Some(profile) => {
                apply(profile);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn insert(
        &self,
        subject: SubjectId,
        profile: &NewProfile,
    ) -> Result<Profile, ProfilePersistenceError> {
        let mut profiles = self.profiles();
        if profiles.iter().any(|p| p.subject == subject) {
            return Err(ProfilePersistenceError::query(
                "profile already exists for subject",
            ));
        }
        let now = Utc::now();
        let stored = Profile {
            id: Uuid::new_v4(),
            subject,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            role: profile.role,
            department: profile.department.clone(),
            student_id: profile.student_id.clone(),
            faculty_id: profile.faculty_id.clone(),
            bio: profile.bio.clone(),
            avatar_url: None,
            language_preference: profile.language_preference,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        profiles.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_subject(
        &self,
        subject: SubjectId,
    ) -> Result<Option<Profile>, ProfilePersistenceError> {
        Ok(self
            .profiles()
            .iter()
            .find(|p| p.subject == subject)
            .cloned())
    }

    async fn find_role(&self, subject: SubjectId) -> Result<Option<Role>, ProfilePersistenceError> {
        Ok(self
            .profiles()
            .iter()
            .find(|p| p.subject == subject)
            .map(|p| p.role))
    }

    async fn list(&self, listing: &ProfileListing) -> Result<ProfilePage, ProfilePersistenceError> {
        Ok(listing.select_page(&self.profiles()))
    }

    async fn update(
        &self,
        subject: SubjectId,
        changes: &ProfileChanges,
    ) -> Result<bool, ProfilePersistenceError> {
        Ok(self.mutate(subject, |profile| Self::apply_changes(profile, changes)))
    }

    async fn set_active(
        &self,
        subject: SubjectId,
        active: bool,
    ) -> Result<bool, ProfilePersistenceError> {
        Ok(self.mutate(subject, |profile| {
            profile.is_active = active;
            profile.updated_at = Utc::now();
        }))
    }

    async fn update_role(
        &self,
        subject: SubjectId,
        role: Role,
    ) -> Result<bool, ProfilePersistenceError> {
        Ok(self.mutate(subject, |profile| {
            profile.role = role;
            profile.updated_at = Utc::now();
        }))
    }

    async fn delete(&self, subject: SubjectId) -> Result<bool, ProfilePersistenceError> {
        let mut profiles = self.profiles();
        let before = profiles.len();
        profiles.retain(|p| p.subject != subject);
        Ok(profiles.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::profile::LanguagePreference;

    fn new_profile(role: Role) -> NewProfile {
        NewProfile {
            first_name: "Ahmed".to_owned(),
            last_name: "Benali".to_owned(),
            role,
            department: Some("Computer Science".to_owned()),
            student_id: Some("S-2024-001".to_owned()),
            faculty_id: None,
            bio: None,
            language_preference: LanguagePreference::En,
        }
    }

    fn subject(n: u128) -> SubjectId {
        SubjectId::from_uuid(Uuid::from_u128(n))
    }

    #[rstest]
    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let repo = InMemoryProfileRepository::new();
        let stored = repo
            .insert(subject(1), &new_profile(Role::Student))
            .await
            .expect("insert");
        assert!(stored.is_active);

        let found = repo
            .find_by_subject(subject(1))
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, stored);
        assert_eq!(
            repo.find_role(subject(1)).await.expect("role"),
            Some(Role::Student)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_second_profile_for_subject() {
        let repo = InMemoryProfileRepository::new();
        repo.insert(subject(1), &new_profile(Role::Student))
            .await
            .expect("insert");
        let err = repo
            .insert(subject(1), &new_profile(Role::Faculty))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, ProfilePersistenceError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let repo = InMemoryProfileRepository::new();
        repo.insert(subject(1), &new_profile(Role::Student))
            .await
            .expect("insert");

        let changes = ProfileChanges {
            bio: Some("Hello".to_owned()),
            ..ProfileChanges::default()
        };
        assert!(repo.update(subject(1), &changes).await.expect("update"));

        let found = repo
            .find_by_subject(subject(1))
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.bio.as_deref(), Some("Hello"));
        assert_eq!(found.first_name, "Ahmed");
    }

    #[rstest]
    #[tokio::test]
    async fn mutations_report_missing_subjects() {
        let repo = InMemoryProfileRepository::new();
        assert!(
            !repo
                .update(subject(2), &ProfileChanges::default())
                .await
                .expect("update")
        );
        assert!(!repo.set_active(subject(2), false).await.expect("set"));
        assert!(
            !repo
                .update_role(subject(2), Role::Faculty)
                .await
                .expect("role")
        );
        assert!(!repo.delete(subject(2)).await.expect("delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn soft_deactivated_profiles_stay_listed() {
        let repo = InMemoryProfileRepository::new();
        repo.insert(subject(1), &new_profile(Role::Student))
            .await
            .expect("insert");
        repo.set_active(subject(1), false).await.expect("set");

        let page = repo.list(&ProfileListing::default()).await.expect("list");
        assert_eq!(page.total_items, 1);
        assert!(!page.items[0].is_active);
    }
}
