//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API. It
//! registers every user-administration endpoint, the health probes, the
//! request and response schemas, and the bearer-token security scheme.
//! Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, LanguagePreference, Role};
use crate::inbound::http::users::{
    CreateUserRequest, CreatedUserResponse, MessageResponse, PaginationMeta, ProfileResponse,
    ResetPasswordRequest, UpdateRoleRequest, UpdateUserRequest, UserListResponse, UserResponse,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by the identity provider."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus backend API",
        description = "User administration endpoints for the campus platform."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::update_role,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        LanguagePreference,
        ProfileResponse,
        PaginationMeta,
        UserListResponse,
        UserResponse,
        MessageResponse,
        CreatedUserResponse,
        CreateUserRequest,
        UpdateUserRequest,
        ResetPasswordRequest,
        UpdateRoleRequest,
    )),
    tags(
        (name = "users", description = "User administration"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::OpenApi;

    use super::*;

    #[rstest]
    fn document_registers_every_user_endpoint() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v1/users/{id}/reset-password",
            "/api/v1/users/{id}/role",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains(&expected), "missing path: {expected}");
        }
    }

    #[rstest]
    fn document_declares_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
