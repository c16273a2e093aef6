//! Campus user profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Campus role attached to every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Teaching or research staff.
    Faculty,
    /// Platform administrator.
    Administrator,
}

impl Role {
    /// Stable lowercase name used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
            Self::Administrator => "administrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role name is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised role: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "faculty" => Ok(Self::Faculty),
            "administrator" => Ok(Self::Administrator),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

/// Interface language stored on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePreference {
    /// Arabic.
    Ar,
    /// French.
    Fr,
    /// English.
    #[default]
    En,
}

impl LanguagePreference {
    /// Stable lowercase code used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Fr => "fr",
            Self::En => "en",
        }
    }
}

impl std::fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a language code is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct ParseLanguageError(pub String);

impl std::str::FromStr for LanguagePreference {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ar" => Ok(Self::Ar),
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            other => Err(ParseLanguageError(other.to_owned())),
        }
    }
}

/// Identity-provider subject identifier linking a profile to its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(Uuid);

/// Raised when a subject identifier is not a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subject id must be a UUID: {0}")]
pub struct ParseSubjectIdError(String);

impl SubjectId {
    /// Parse a subject identifier from its textual UUID form.
    ///
    /// # Errors
    /// Returns [`ParseSubjectIdError`] when the value is not a valid UUID.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ParseSubjectIdError> {
        let value = value.as_ref();
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ParseSubjectIdError(value.to_owned()))
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored campus user profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Profile row identifier.
    pub id: Uuid,
    /// Identity-provider subject this profile belongs to.
    pub subject: SubjectId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Campus role.
    pub role: Role,
    /// Department or school, where applicable.
    pub department: Option<String>,
    /// Student registration number; populated for students.
    pub student_id: Option<String>,
    /// Staff registration number; populated for faculty.
    pub faculty_id: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Avatar image location.
    pub avatar_url: Option<String>,
    /// Interface language.
    pub language_preference: LanguagePreference,
    /// False once the user has been soft-deleted.
    pub is_active: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when provisioning a new profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Campus role.
    pub role: Role,
    /// Department or school, where applicable.
    pub department: Option<String>,
    /// Student registration number.
    pub student_id: Option<String>,
    /// Staff registration number.
    pub faculty_id: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Interface language.
    pub language_preference: LanguagePreference,
}

/// Partial profile update; `None` fields are left untouched.
///
/// Credentials are deliberately absent: email and password changes go
/// through the identity provider, never through profile updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement department.
    pub department: Option<String>,
    /// Replacement student registration number.
    pub student_id: Option<String>,
    /// Replacement staff registration number.
    pub faculty_id: Option<String>,
    /// Replacement biography.
    pub bio: Option<String>,
    /// Replacement avatar location.
    pub avatar_url: Option<String>,
    /// Replacement interface language.
    pub language_preference: Option<LanguagePreference>,
}

impl ProfileChanges {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.department.is_none()
            && self.student_id.is_none()
            && self.faculty_id.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.language_preference.is_none()
    }
}

/// How a user removal should be carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Deactivate the profile but keep the account and row.
    #[default]
    Soft,
    /// Remove the identity and the profile row permanently.
    Hard,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("student", Role::Student)]
    #[case("faculty", Role::Faculty)]
    #[case("administrator", Role::Administrator)]
    fn role_parses_known_names(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(Role::from_str(input), Ok(expected));
        assert_eq!(expected.as_str(), input);
    }

    #[rstest]
    #[case("admin")]
    #[case("Student")]
    #[case("")]
    fn role_rejects_unknown_names(#[case] input: &str) {
        assert!(Role::from_str(input).is_err());
    }

    #[rstest]
    #[case("ar", LanguagePreference::Ar)]
    #[case("fr", LanguagePreference::Fr)]
    #[case("en", LanguagePreference::En)]
    fn language_parses_supported_codes(#[case] input: &str, #[case] expected: LanguagePreference) {
        assert_eq!(LanguagePreference::from_str(input), Ok(expected));
    }

    #[rstest]
    fn language_defaults_to_english() {
        assert_eq!(LanguagePreference::default(), LanguagePreference::En);
    }

    #[rstest]
    fn subject_id_round_trips_through_text() {
        let id = SubjectId::new("11111111-1111-1111-1111-111111111111").expect("valid uuid");
        assert_eq!(id.to_string(), "11111111-1111-1111-1111-111111111111");
    }

    #[rstest]
    fn subject_id_rejects_non_uuid_text() {
        assert!(SubjectId::new("not-a-uuid").is_err());
    }

    #[rstest]
    fn empty_changes_are_detected() {
        assert!(ProfileChanges::default().is_empty());
        let changes = ProfileChanges {
            bio: Some("hello".to_owned()),
            ..ProfileChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
