//! Endpoint tests for the user administration handlers, driven over
//! in-memory identity and profile ports.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{InMemoryIdentityProvider, InMemoryProfileRepository, ProfileRepository};
use crate::domain::{
    AccessControlService, ErrorCode, LanguagePreference, UserAdminService,
};

const ADMIN_TOKEN: &str = "admin-token";
const STUDENT_TOKEN: &str = "student-token";

struct TestContext {
    identity: Arc<InMemoryIdentityProvider>,
    profiles: Arc<InMemoryProfileRepository>,
    state: HttpState,
}

fn subject(n: u128) -> SubjectId {
    SubjectId::from_uuid(Uuid::from_u128(n))
}

fn new_profile(first: &str, last: &str, role: Role) -> NewProfile {
    NewProfile {
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        role,
        department: None,
        student_id: (role == Role::Student).then(|| "S-0001".to_owned()),
        faculty_id: (role == Role::Faculty).then(|| "F-0001".to_owned()),
        bio: None,
        language_preference: LanguagePreference::En,
    }
}

async fn context() -> TestContext {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let profiles = Arc::new(InMemoryProfileRepository::new());

    let admin = subject(1);
    identity.register(admin, "admin@campus.example");
    identity.issue_token(ADMIN_TOKEN, admin);
    profiles
        .insert(admin, &new_profile("Root", "Admin", Role::Administrator))
        .await
        .expect("seed admin");

    let student = subject(2);
    identity.register(student, "student@campus.example");
    identity.issue_token(STUDENT_TOKEN, student);
    profiles
        .insert(student, &new_profile("Sami", "Student", Role::Student))
        .await
        .expect("seed student");

    let access = Arc::new(AccessControlService::new(
        identity.clone(),
        profiles.clone(),
    ));
    let admin_service = Arc::new(UserAdminService::new(identity.clone(), profiles.clone()));
    let state = HttpState::new(access, admin_service.clone(), admin_service);
    TestContext {
        identity,
        profiles,
        state,
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .service(
                    web::scope("/api/v1")
                        .service(list_users)
                        .service(create_user)
                        .service(get_user)
                        .service(update_user)
                        .service(delete_user)
                        .service(reset_password)
                        .service(update_role),
                ),
        )
        .await
    };
}

async fn body_json(res: ServiceResponse<BoxBody>) -> Value {
    test::read_body_json(res).await
}

async fn error_payload(res: ServiceResponse<BoxBody>) -> Error {
    test::read_body_json(res).await
}

fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

fn create_body(email: &str, first: &str, last: &str, role: &str) -> Value {
    let mut body = json!({
        "email": email,
        "password": "secret-password",
        "first_name": first,
        "last_name": last,
        "role": role,
    });
    if role == "student" {
        body["student_id"] = json!("S-2024-100");
    }
    if role == "faculty" {
        body["faculty_id"] = json!("F-2024-100");
    }
    body
}

#[rstest]
#[actix_web::test]
async fn missing_authorization_header_is_unauthorized() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let res =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/users").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let err = error_payload(res).await;
    assert_eq!(err.message(), "Authorization header is required");
}

#[rstest]
#[case("Token abc", "Bearer token is required")]
#[case("Bearer ", "Bearer token is required")]
#[actix_web::test]
async fn malformed_authorization_header_is_unauthorized(
    #[case] header: &str,
    #[case] expected: &str,
) {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(("Authorization", header))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_payload(res).await.message(), expected);
}

#[rstest]
#[actix_web::test]
async fn forged_token_is_unauthorized() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = authed(test::TestRequest::get().uri("/api/v1/users"), "forged").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_payload(res).await.message(), "Invalid or expired token");
}

#[rstest]
#[actix_web::test]
async fn non_administrators_are_forbidden() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = authed(test::TestRequest::get().uri("/api/v1/users"), STUDENT_TOKEN).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        error_payload(res).await.message(),
        "Forbidden: Requires one of these roles: administrator"
    );
}

#[rstest]
#[actix_web::test]
async fn verified_subject_without_profile_is_unauthorized() {
    let ctx = context().await;
    let ghost = subject(50);
    ctx.identity.register(ghost, "ghost@campus.example");
    ctx.identity.issue_token("ghost-token", ghost);
    let app = init_app!(ctx);
    let req = authed(test::TestRequest::get().uri("/api/v1/users"), "ghost-token").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_payload(res).await.message(), "User profile not found");
}

#[rstest]
#[actix_web::test]
async fn search_matches_either_name_case_insensitively() {
    let ctx = context().await;
    for (first, last) in [
        ("Ahmed", "Benali"),
        ("Sara", "Ahmedi"),
        ("AHMED", "Ziani"),
        ("Mona", "Haddad"),
    ] {
        ctx.profiles
            .insert(
                SubjectId::from_uuid(Uuid::new_v4()),
                &new_profile(first, last, Role::Student),
            )
            .await
            .expect("seed profile");
    }
    let app = init_app!(ctx);

    let req = authed(
        test::TestRequest::get().uri("/api/v1/users?search=ahmed"),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["pagination"]["totalItems"], 3);
    assert_eq!(body["pagination"]["totalPages"], 1);
}

#[rstest]
#[actix_web::test]
async fn listing_pages_and_filters_by_role() {
    let ctx = context().await;
    for n in 0..4 {
        ctx.profiles
            .insert(
                subject(100 + n),
                &new_profile(&format!("Student{n}"), "Test", Role::Student),
            )
            .await
            .expect("seed student");
    }
    let app = init_app!(ctx);

    // 4 seeded here + 1 from the fixture = 5 students.
    let req = authed(
        test::TestRequest::get().uri("/api/v1/users?role=student&page=2&limit=2"),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    let body = body_json(res).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["totalItems"], 5);
    assert_eq!(body["pagination"]["totalPages"], 3);
    for row in body["data"].as_array().expect("data array") {
        assert_eq!(row["role"], "student");
    }
}

#[rstest]
#[actix_web::test]
async fn nonsense_page_and_oversized_limit_fall_back() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = authed(
        test::TestRequest::get().uri("/api/v1/users?page=abc&limit=5000"),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
}

#[rstest]
#[case("role=dean")]
#[case("sort=email")]
#[case("order=sideways")]
#[actix_web::test]
async fn invalid_filter_values_are_rejected(#[case] query: &str) {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users?{query}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn created_users_are_immediately_fetchable() {
    let ctx = context().await;
    let app = init_app!(ctx);

    let req = authed(test::TestRequest::post().uri("/api/v1/users"), ADMIN_TOKEN)
        .set_json(create_body("new@campus.example", "Nadia", "Karim", "faculty"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["message"], "User created successfully");
    let user_id = body["userId"].as_str().expect("userId").to_owned();

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users/{user_id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["user_id"], user_id.as_str());
    assert_eq!(body["data"]["first_name"], "Nadia");
    assert_eq!(body["data"]["role"], "faculty");
    assert_eq!(body["data"]["is_active"], true);
}

#[rstest]
#[actix_web::test]
async fn student_creation_requires_a_student_id() {
    let ctx = context().await;
    let app = init_app!(ctx);

    let mut body = create_body("s@campus.example", "Ahmed", "Benali", "student");
    body.as_object_mut().expect("object").remove("student_id");
    let req = authed(test::TestRequest::post().uri("/api/v1/users"), ADMIN_TOKEN)
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = error_payload(res).await;
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some("student_id"));

    // Nothing was provisioned.
    let req = authed(
        test::TestRequest::get().uri("/api/v1/users?search=benali"),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    let body = body_json(res).await;
    assert_eq!(body["pagination"]["totalItems"], 0);
}

#[rstest]
#[case(json!({"password": "secret-password"}), "email")]
#[case(json!({"email": "x@campus.example", "password": "abc"}), "password")]
#[case(json!({"email": "x@campus.example", "password": "secret-password"}), "first_name")]
#[actix_web::test]
async fn creation_validates_required_fields(#[case] body: Value, #[case] field: &str) {
    let ctx = context().await;
    let app = init_app!(ctx);
    let req = authed(test::TestRequest::post().uri("/api/v1/users"), ADMIN_TOKEN)
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err = error_payload(res).await;
    assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some(field));
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_bad_request() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let body = create_body("dup@campus.example", "Ahmed", "Benali", "student");

    let req = authed(test::TestRequest::post().uri("/api/v1/users"), ADMIN_TOKEN)
        .set_json(body.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = authed(test::TestRequest::post().uri("/api/v1/users"), ADMIN_TOKEN)
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let ctx = context().await;
    let app = init_app!(ctx);
    for id in [Uuid::from_u128(999).to_string(), "not-a-uuid".to_owned()] {
        let req = authed(
            test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
            ADMIN_TOKEN,
        )
        .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_payload(res).await.message(), "User not found");
    }
}

#[rstest]
#[actix_web::test]
async fn updates_ignore_credential_keys() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();

    let req = authed(
        test::TestRequest::put().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .set_json(json!({
        "email": "hijack@campus.example",
        "password": "pwned-password",
        "bio": "Third-year CS student",
    }))
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "User updated successfully");

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["bio"], "Third-year CS student");
}

#[rstest]
#[actix_web::test]
async fn update_with_only_credential_keys_is_rejected() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();

    let req = authed(
        test::TestRequest::put().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .set_json(json!({
        "email": "hijack@campus.example",
        "password": "pwned-password",
    }))
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_payload(res).await.message(),
        "No updatable fields provided"
    );
}

#[rstest]
#[actix_web::test]
async fn default_delete_deactivates_but_keeps_the_user() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();

    let req = authed(
        test::TestRequest::delete().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "User deactivated successfully");

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["is_active"], false);
    assert!(ctx.identity.has_account(subject(2)));
}

#[rstest]
#[actix_web::test]
async fn hard_delete_removes_identity_and_profile() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();

    let req = authed(
        test::TestRequest::delete().uri(&format!("/api/v1/users/{id}?hardDelete=true")),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "User deleted successfully");
    assert!(!ctx.identity.has_account(subject(2)));

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn password_reset_enforces_the_minimum_length() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();
    let uri = format!("/api/v1/users/{id}/reset-password");

    let req = authed(test::TestRequest::post().uri(&uri), ADMIN_TOKEN)
        .set_json(json!({"newPassword": "abc"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let req = authed(test::TestRequest::post().uri(&uri), ADMIN_TOKEN)
        .set_json(json!({"newPassword": "a-new-password"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "Password reset successfully");
}

#[rstest]
#[actix_web::test]
async fn role_changes_apply_and_repeat_cleanly() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let id = subject(2).to_string();
    let uri = format!("/api/v1/users/{id}/role");

    for _ in 0..2 {
        let req = authed(test::TestRequest::post().uri(&uri), ADMIN_TOKEN)
            .set_json(json!({"role": "faculty"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["message"], "User role updated successfully");
    }

    let req = authed(
        test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
        ADMIN_TOKEN,
    )
    .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["role"], "faculty");

    let req = authed(test::TestRequest::post().uri(&uri), ADMIN_TOKEN)
        .set_json(json!({"role": "dean"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn role_changes_only_accept_post() {
    let ctx = context().await;
    let app = init_app!(ctx);
    let uri = format!("/api/v1/users/{}/role", subject(2));

    let req = authed(test::TestRequest::put().uri(&uri), ADMIN_TOKEN)
        .set_json(json!({"role": "faculty"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[std::prelude::v1::test]
fn delete_mode_parsing_defaults_to_soft() {
    assert_eq!(
        parse_delete_mode(DeleteUserQuery {
            hard_delete: Some("true".to_owned())
        }),
        DeleteMode::Hard
    );
    assert_eq!(
        parse_delete_mode(DeleteUserQuery {
            hard_delete: Some("false".to_owned())
        }),
        DeleteMode::Soft
    );
    assert_eq!(
        parse_delete_mode(DeleteUserQuery { hard_delete: None }),
        DeleteMode::Soft
    );
}

#[rstest]
#[std::prelude::v1::test]
fn listing_parser_applies_defaults() {
    let listing = parse_listing(ListUsersQuery::default()).expect("defaults");
    assert_eq!(listing.page.page(), 1);
    assert_eq!(listing.page.limit(), 10);
    assert_eq!(listing.sort.column, SortColumn::CreatedAt);
    assert_eq!(listing.sort.direction, SortDirection::Desc);
    assert!(listing.role.is_none());
    assert!(listing.search.is_none());
}
