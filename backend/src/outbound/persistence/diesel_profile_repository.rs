//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.
//!
//! Translates between Diesel row structs and domain profile types. Directory
//! listings push the role filter, the name search, the ordering, and the page
//! window into SQL so only the requested page crosses the wire.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::listing::{ProfileListing, ProfilePage, SortColumn, SortDirection};
use crate::domain::ports::{ProfilePersistenceError, ProfileRepository};
use crate::domain::profile::{LanguagePreference, NewProfile, Profile, ProfileChanges, Role, SubjectId};

use super::models::{NewProfileRow, ProfileChangesRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain profile persistence errors.
fn map_pool_error(error: PoolError) -> ProfilePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ProfilePersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain profile persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> ProfilePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ProfilePersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => ProfilePersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ProfilePersistenceError::query("profile already exists for subject")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ProfilePersistenceError::connection("database connection error")
        }
        _ => ProfilePersistenceError::query("database error"),
    }
}

/// Escape LIKE metacharacters so search terms match literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Convert a database row to a domain profile.
///
/// An unrecognised role is a data integrity failure and surfaces as a query
/// error; an unrecognised language falls back to the default with a warning.
fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfilePersistenceError> {
    let role = parse_stored_role(&row.role)?;
    let language_preference =
        LanguagePreference::from_str(&row.language_preference).unwrap_or_else(|_| {
            warn!(
                value = row.language_preference,
                user_id = %row.user_id,
                "unrecognised language_preference value, defaulting to en"
            );
            LanguagePreference::default()
        });

    Ok(Profile {
        id: row.id,
        subject: SubjectId::from_uuid(row.user_id),
        first_name: row.first_name,
        last_name: row.last_name,
        role,
        department: row.department,
        student_id: row.student_id,
        faculty_id: row.faculty_id,
        bio: row.bio,
        avatar_url: row.avatar_url,
        language_preference,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn parse_stored_role(value: &str) -> Result<Role, ProfilePersistenceError> {
    Role::from_str(value)
        .map_err(|_| ProfilePersistenceError::query(format!("unrecognised stored role: {value}")))
}

fn new_profile_row(subject: SubjectId, profile: &NewProfile) -> NewProfileRow<'_> {
    NewProfileRow {
        user_id: subject.as_uuid(),
        first_name: &profile.first_name,
        last_name: &profile.last_name,
        role: profile.role.as_str(),
        department: profile.department.as_deref(),
        student_id: profile.student_id.as_deref(),
        faculty_id: profile.faculty_id.as_deref(),
        bio: profile.bio.as_deref(),
        language_preference: profile.language_preference.as_str(),
    }
}

fn changes_row(changes: &ProfileChanges) -> ProfileChangesRow<'_> {
    ProfileChangesRow {
        first_name: changes.first_name.as_deref(),
        last_name: changes.last_name.as_deref(),
        department: changes.department.as_deref(),
        student_id: changes.student_id.as_deref(),
        faculty_id: changes.faculty_id.as_deref(),
        bio: changes.bio.as_deref(),
        avatar_url: changes.avatar_url.as_deref(),
        language_preference: changes
            .language_preference
            .map(LanguagePreference::as_str),
    }
}

/// Apply the listing's role filter and name search to a boxed query.
fn filtered(listing: &ProfileListing) -> profiles::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = profiles::table.into_boxed();
    if let Some(role) = listing.role {
        query = query.filter(profiles::role.eq(role.as_str()));
    }
    if let Some(term) = &listing.search {
        let pattern = like_pattern(term);
        query = query.filter(
            profiles::first_name
                .ilike(pattern.clone())
                .or(profiles::last_name.ilike(pattern)),
        );
    }
    query
}

/// Apply the listing's ordering to a boxed query.
///
/// The sort column comes from a closed enum, so no caller-supplied text ever
/// reaches the ORDER BY clause.
fn ordered(
    query: profiles::BoxedQuery<'static, diesel::pg::Pg>,
    listing: &ProfileListing,
) -> profiles::BoxedQuery<'static, diesel::pg::Pg> {
    match (listing.sort.column, listing.sort.direction) {
        (SortColumn::CreatedAt, SortDirection::Asc) => query.order(profiles::created_at.asc()),
        (SortColumn::CreatedAt, SortDirection::Desc) => query.order(profiles::created_at.desc()),
        (SortColumn::UpdatedAt, SortDirection::Asc) => query.order(profiles::updated_at.asc()),
        (SortColumn::UpdatedAt, SortDirection::Desc) => query.order(profiles::updated_at.desc()),
        (SortColumn::FirstName, SortDirection::Asc) => query.order(profiles::first_name.asc()),
        (SortColumn::FirstName, SortDirection::Desc) => query.order(profiles::first_name.desc()),
        (SortColumn::LastName, SortDirection::Asc) => query.order(profiles::last_name.asc()),
        (SortColumn::LastName, SortDirection::Desc) => query.order(profiles::last_name.desc()),
        (SortColumn::Role, SortDirection::Asc) => query.order(profiles::role.asc()),
        (SortColumn::Role, SortDirection::Desc) => query.order(profiles::role.desc()),
    }
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn insert(
        &self,
        subject: SubjectId,
        profile: &NewProfile,
    ) -> Result<Profile, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ProfileRow = diesel::insert_into(profiles::table)
            .values(new_profile_row(subject, profile))
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_profile(row)
    }

    async fn find_by_subject(
        &self,
        subject: SubjectId,
    ) -> Result<Option<Profile>, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = profiles::table
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_profile).transpose()
    }

    async fn find_role(&self, subject: SubjectId) -> Result<Option<Role>, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored: Option<String> = profiles::table
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .select(profiles::role)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        stored.as_deref().map(parse_stored_role).transpose()
    }

    async fn list(&self, listing: &ProfileListing) -> Result<ProfilePage, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(listing)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ProfileRow> = ordered(filtered(listing), listing)
            .offset(listing.page.offset())
            .limit(i64::from(listing.page.limit()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_profile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProfilePage {
            items,
            total_items: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn update(
        &self,
        subject: SubjectId,
        changes: &ProfileChanges,
    ) -> Result<bool, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(profiles::table)
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .set((changes_row(changes), profiles::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn set_active(
        &self,
        subject: SubjectId,
        active: bool,
    ) -> Result<bool, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(profiles::table)
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .set((
                profiles::is_active.eq(active),
                profiles::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn update_role(
        &self,
        subject: SubjectId,
        role: Role,
    ) -> Result<bool, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(profiles::table)
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .set((
                profiles::role.eq(role.as_str()),
                profiles::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn delete(&self, subject: SubjectId) -> Result<bool, ProfilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(profiles::table)
            .filter(profiles::user_id.eq(subject.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }
}
