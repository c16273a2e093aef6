//! Internal Diesel row structs for the profile store.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::profiles;

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub department: Option<String>,
    pub student_id: Option<String>,
    pub faculty_id: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub language_preference: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for provisioning a new profile row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub user_id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub department: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub faculty_id: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub language_preference: &'a str,
}

/// Changeset struct for partial profile updates.
///
/// `None` fields are skipped by Diesel, matching the domain's partial-update
/// semantics.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileChangesRow<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub department: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub faculty_id: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub language_preference: Option<&'a str>,
}
