//! Builders wiring domain services to real or fixture adapters.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    IdentityProvider, InMemoryIdentityProvider, InMemoryProfileRepository, ProfileRepository,
};
use crate::domain::{
    AccessControlService, LanguagePreference, Profile, Role, SubjectId, UserAdminService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::identity::{HttpIdentityProvider, IdentitySetupError};
use crate::outbound::persistence::DieselProfileRepository;

use super::config::ServerConfig;

/// Bearer token accepted by fixture-mode servers.
pub const FIXTURE_ADMIN_TOKEN: &str = "fixture-admin-token";
const FIXTURE_ADMIN_SUBJECT: Uuid = Uuid::from_u128(0xF1A7);
const FIXTURE_ADMIN_EMAIL: &str = "admin@campus.example";

/// Build the handler dependency bundle from the server configuration.
///
/// Real adapters are used when both the database pool and the identity
/// settings are present; otherwise the server falls back to seeded in-memory
/// fixtures and logs a warning.
///
/// # Errors
/// Returns [`IdentitySetupError`] when the identity HTTP client cannot be
/// constructed from the supplied settings.
pub(crate) fn build_http_state(config: &ServerConfig) -> Result<HttpState, IdentitySetupError> {
    let (identity, profiles): (Arc<dyn IdentityProvider>, Arc<dyn ProfileRepository>) =
        match (&config.identity, &config.db_pool) {
            (Some(settings), Some(pool)) => (
                Arc::new(HttpIdentityProvider::new(settings.clone())?),
                Arc::new(DieselProfileRepository::new(pool.clone())),
            ),
            _ => {
                warn!("identity or database configuration missing; serving seeded fixtures");
                (fixture_identity(), fixture_profiles())
            }
        };

    let access = Arc::new(AccessControlService::new(
        identity.clone(),
        profiles.clone(),
    ));
    let admin = Arc::new(UserAdminService::new(identity, profiles));
    Ok(HttpState::new(access, admin.clone(), admin))
}

fn fixture_identity() -> Arc<dyn IdentityProvider> {
    let provider = InMemoryIdentityProvider::new();
    let subject = SubjectId::from_uuid(FIXTURE_ADMIN_SUBJECT);
    provider.register(subject, FIXTURE_ADMIN_EMAIL);
    provider.issue_token(FIXTURE_ADMIN_TOKEN, subject);
    Arc::new(provider)
}

fn fixture_profiles() -> Arc<dyn ProfileRepository> {
    let repository = InMemoryProfileRepository::new();
    let now = Utc::now();
    repository.seed(Profile {
        id: Uuid::new_v4(),
        subject: SubjectId::from_uuid(FIXTURE_ADMIN_SUBJECT),
        first_name: "Fixture".to_owned(),
        last_name: "Administrator".to_owned(),
        role: Role::Administrator,
        department: None,
        student_id: None,
        faculty_id: None,
        bio: None,
        avatar_url: None,
        language_preference: LanguagePreference::En,
        is_active: true,
        created_at: now,
        updated_at: now,
    });
    Arc::new(repository)
}
