//! User administration HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! POST   /api/v1/users
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/users/{id}/reset-password
//! PUT    /api/v1/users/{id}/role
//! ```
//!
//! Every endpoint requires the [`Capability::ManageUsers`] gate. The `{id}`
//! segment is the identity-provider subject, not the profile row id.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::listing::{ProfileSort, SortColumn, SortDirection};
use crate::domain::ports::CreateUser;
use crate::domain::{
    Capability, DeleteMode, Error, NewProfile, Profile, ProfileChanges, ProfileListing, Role,
    SubjectId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::bearer_header;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, non_blank, parse_email, parse_language, parse_password,
    parse_role, require_text,
};

#[cfg(test)]
mod tests;

const USER_NOT_FOUND: &str = "User not found";

/// Raw listing query parameters; everything arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    page: Option<String>,
    limit: Option<String>,
    role: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    order: Option<String>,
}

/// Profile payload returned by the directory endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// Profile row identifier.
    pub id: String,
    /// Identity-provider subject.
    pub user_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Campus role.
    pub role: Role,
    /// Department or school.
    pub department: Option<String>,
    /// Student registration number.
    pub student_id: Option<String>,
    /// Staff registration number.
    pub faculty_id: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Avatar image location.
    pub avatar_url: Option<String>,
    /// Interface language.
    pub language_preference: String,
    /// False once soft-deleted.
    pub is_active: bool,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last modification time, RFC 3339.
    pub updated_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.subject.to_string(),
            first_name: value.first_name,
            last_name: value.last_name,
            role: value.role,
            department: value.department,
            student_id: value.student_id,
            faculty_id: value.faculty_id,
            bio: value.bio,
            avatar_url: value.avatar_url,
            language_preference: value.language_preference.to_string(),
            is_active: value.is_active,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Pagination metadata block.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// 1-based page number served.
    pub page: u32,
    /// Page size served.
    pub limit: u32,
    /// Total matching users.
    pub total_items: u64,
    /// Total pages at this page size.
    pub total_pages: u64,
}

impl From<PageInfo> for PaginationMeta {
    fn from(value: PageInfo) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
            total_items: value.total_items,
            total_pages: value.total_pages,
        }
    }
}

/// Directory listing response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// One page of profiles.
    pub data: Vec<ProfileResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Single-user response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// The requested profile.
    pub data: ProfileResponse,
}

/// Acknowledgement payload for mutations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Payload returned after provisioning a user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Subject identifier of the new user.
    pub user_id: String,
}

/// Request payload for provisioning a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    /// Login email.
    pub email: Option<String>,
    /// Initial password (minimum 6 characters).
    pub password: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Campus role.
    pub role: Option<String>,
    /// Department or school.
    pub department: Option<String>,
    /// Student registration number; required for students.
    pub student_id: Option<String>,
    /// Staff registration number; required for faculty.
    pub faculty_id: Option<String>,
    /// Free-form biography.
    pub bio: Option<String>,
    /// Interface language; defaults to `en`.
    pub language_preference: Option<String>,
}

/// Request payload for a partial profile update.
///
/// Credentials are not part of this payload; `email` and `password` keys in
/// the body are ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
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
    pub language_preference: Option<String>,
}

/// Query flag selecting hard deletion.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserQuery {
    #[serde(rename = "hardDelete")]
    hard_delete: Option<String>,
}

/// Request payload for an administrative password reset.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Replacement password (minimum 6 characters).
    pub new_password: Option<String>,
}

/// Request payload for a role change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// New campus role.
    pub role: Option<String>,
}

fn parse_subject(id: &str) -> Result<SubjectId, Error> {
    // An unparseable id cannot match any user; report it the same way.
    SubjectId::new(id).map_err(|_| Error::not_found(USER_NOT_FOUND))
}

fn optional_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_listing(query: ListUsersQuery) -> Result<ProfileListing, Error> {
    let page = PageRequest::lenient(
        query.page.as_deref().and_then(|v| v.parse::<i64>().ok()),
        query.limit.as_deref().and_then(|v| v.parse::<i64>().ok()),
    );
    let role = optional_trimmed(query.role)
        .map(|value| parse_role(&value, FieldName::new("role")))
        .transpose()?;
    let column = optional_trimmed(query.sort)
        .map(|value| {
            value.parse::<SortColumn>().map_err(|error| {
                Error::invalid_request(error.to_string()).with_details(serde_json::json!({
                    "field": "sort",
                    "value": value,
                    "code": "invalid_sort_column",
                }))
            })
        })
        .transpose()?
        .unwrap_or_default();
    let direction = optional_trimmed(query.order)
        .map(|value| {
            value.parse::<SortDirection>().map_err(|error| {
                Error::invalid_request(error.to_string()).with_details(serde_json::json!({
                    "field": "order",
                    "value": value,
                    "code": "invalid_sort_order",
                }))
            })
        })
        .transpose()?
        .unwrap_or_default();

    Ok(ProfileListing {
        page,
        role,
        search: optional_trimmed(query.search),
        sort: ProfileSort { column, direction },
    })
}

fn parse_create_request(payload: CreateUserRequest) -> Result<CreateUser, Error> {
    let email = parse_email(payload.email, FieldName::new("email"))?;
    let password = parse_password(payload.password, FieldName::new("password"))?;
    let first_name = require_text(payload.first_name, FieldName::new("first_name"))?;
    let last_name = require_text(payload.last_name, FieldName::new("last_name"))?;
    let role_text = payload
        .role
        .ok_or_else(|| missing_field_error(FieldName::new("role")))?;
    let role = parse_role(role_text.trim(), FieldName::new("role"))?;
    let language_preference =
        parse_language(payload.language_preference, FieldName::new("language_preference"))?;

    let student_id = optional_trimmed(payload.student_id);
    let faculty_id = optional_trimmed(payload.faculty_id);
    match role {
        Role::Student if student_id.is_none() => {
            return Err(missing_field_error(FieldName::new("student_id")));
        }
        Role::Faculty if faculty_id.is_none() => {
            return Err(missing_field_error(FieldName::new("faculty_id")));
        }
        _ => {}
    }

    Ok(CreateUser {
        email,
        password,
        profile: NewProfile {
            first_name,
            last_name,
            role,
            department: optional_trimmed(payload.department),
            student_id,
            faculty_id,
            bio: payload.bio,
            language_preference,
        },
    })
}

fn parse_update_request(payload: UpdateUserRequest) -> Result<ProfileChanges, Error> {
    let first_name = payload
        .first_name
        .map(|value| non_blank(value, FieldName::new("first_name")))
        .transpose()?;
    let last_name = payload
        .last_name
        .map(|value| non_blank(value, FieldName::new("last_name")))
        .transpose()?;
    let language_preference = payload
        .language_preference
        .map(|value| parse_language(Some(value), FieldName::new("language_preference")))
        .transpose()?;

    Ok(ProfileChanges {
        first_name,
        last_name,
        department: optional_trimmed(payload.department),
        student_id: optional_trimmed(payload.student_id),
        faculty_id: optional_trimmed(payload.faculty_id),
        bio: payload.bio,
        avatar_url: optional_trimmed(payload.avatar_url),
        language_preference,
    })
}

fn parse_delete_mode(query: DeleteUserQuery) -> DeleteMode {
    match query.hard_delete.as_deref() {
        Some(value) if value.eq_ignore_ascii_case("true") => DeleteMode::Hard,
        _ => DeleteMode::Soft,
    }
}

/// List users with pagination, filtering, and sorting.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page" = Option<String>, Query, description = "1-based page number, default 1"),
        ("limit" = Option<String>, Query, description = "Page size, default 10, max 100"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("search" = Option<String>, Query, description = "Substring match on first or last name"),
        ("sort" = Option<String>, Query, description = "Sort column, default created_at"),
        ("order" = Option<String>, Query, description = "asc or desc, default desc")
    ),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 400, description = "Invalid filter or sort", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<UserListResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let listing = parse_listing(query.into_inner())?;
    let page = state.directory.list_users(&listing).await?;
    let pagination = PaginationMeta::from(PageInfo::new(listing.page, page.total_items));
    Ok(web::Json(UserListResponse {
        data: page.items.into_iter().map(ProfileResponse::from).collect(),
        pagination,
    }))
}

/// Fetch a single user by subject identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Identity-provider subject (UUID)")),
    responses(
        (status = 200, description = "The requested user", body = UserResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let subject = parse_subject(&path.into_inner())?;
    let profile = state.directory.fetch_user(subject).await?;
    Ok(web::Json(UserResponse {
        data: ProfileResponse::from(profile),
    }))
}

/// Provision a new user: identity first, then profile.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Validation or business failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let request = parse_create_request(payload.into_inner())?;
    let profile = state.provisioning.create_user(request).await?;
    Ok(HttpResponse::Created().json(CreatedUserResponse {
        message: "User created successfully".to_owned(),
        user_id: profile.subject.to_string(),
    }))
}

/// Apply a partial profile update.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Identity-provider subject (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let subject = parse_subject(&path.into_inner())?;
    let changes = parse_update_request(payload.into_inner())?;
    state.provisioning.update_user(subject, changes).await?;
    Ok(web::Json(MessageResponse {
        message: "User updated successfully".to_owned(),
    }))
}

/// Deactivate a user, or remove them permanently with `hardDelete=true`.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "Identity-provider subject (UUID)"),
        ("hardDelete" = Option<String>, Query, description = "Set to true for permanent removal")
    ),
    responses(
        (status = 200, description = "User removed", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<DeleteUserQuery>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let subject = parse_subject(&path.into_inner())?;
    let mode = parse_delete_mode(query.into_inner());
    state.provisioning.delete_user(subject, mode).await?;
    let message = match mode {
        DeleteMode::Soft => "User deactivated successfully",
        DeleteMode::Hard => "User deleted successfully",
    };
    Ok(web::Json(MessageResponse {
        message: message.to_owned(),
    }))
}

/// Replace a user's password via the identity provider.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/reset-password",
    params(("id" = String, Path, description = "Identity-provider subject (UUID)")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "resetUserPassword"
)]
#[post("/users/{id}/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let subject = parse_subject(&path.into_inner())?;
    let password = parse_password(
        payload.into_inner().new_password,
        FieldName::new("newPassword"),
    )?;
    state.provisioning.reset_password(subject, password).await?;
    Ok(web::Json(MessageResponse {
        message: "Password reset successfully".to_owned(),
    }))
}

/// Replace a user's role.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "Identity-provider subject (UUID)")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role replaced", body = MessageResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Insufficient role", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    security(("BearerToken" = [])),
    tags = ["users"],
    operation_id = "updateUserRole"
)]
#[post("/users/{id}/role")]
pub async fn update_role(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<UpdateRoleRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .access
        .authorize(bearer_header(&req), Capability::ManageUsers)
        .await?;
    let subject = parse_subject(&path.into_inner())?;
    let role_text = payload
        .into_inner()
        .role
        .ok_or_else(|| missing_field_error(FieldName::new("role")))?;
    let role = parse_role(role_text.trim(), FieldName::new("role"))?;
    state.provisioning.change_role(subject, role).await?;
    Ok(web::Json(MessageResponse {
        message: "User role updated successfully".to_owned(),
    }))
}
