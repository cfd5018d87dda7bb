//! User and session handlers.
//!
//! ```text
//! POST   /users                  (open)
//! POST   /users/sessions         (open)
//! POST   /users/sessions/{id}    (open)
//! GET    /users
//! GET    /users/{id}
//! PATCH  /users/{id}
//! DELETE /users/{id}
//! DELETE /users/sessions/{id}
//! ```
//!
//! Open routes issue keys and so cannot require one.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Credentials, CredentialsError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ApiKeyResponse, UserRequest, UserResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const ID: FieldName = FieldName::new("id");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

fn credentials(payload: UserRequest) -> Result<Credentials, Error> {
    let email = payload.email.ok_or_else(|| missing_field_error(EMAIL))?;
    let password = payload.password.ok_or_else(|| missing_field_error(PASSWORD))?;
    Credentials::try_from_parts(&email, &password).map_err(|err| {
        let field = match err {
            CredentialsError::InvalidEmail => "email",
            CredentialsError::EmptyPassword => "password",
        };
        Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
    })
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid credentials", body = Error),
        (status = 409, description = "Email already used", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security(())
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload.into_inner())?;
    let user = state.users.create_user(credentials).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/users/sessions",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Key issued", body = ApiKeyResponse),
        (status = 400, description = "Invalid credentials", body = Error),
        (status = 401, description = "Wrong password", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security(())
)]
#[post("/users/sessions")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload.into_inner())?;
    let key = state.users.login(credentials).await?;
    Ok(HttpResponse::Created().json(ApiKeyResponse::from(key)))
}

/// Issue a key for a known user without a password.
#[utoipa::path(
    post,
    path = "/users/sessions/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 201, description = "Key issued", body = ApiKeyResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "loginById",
    security(())
)]
#[post("/users/sessions/{id}")]
pub async fn login_by_id(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let key = state.users.login_by_id(id).await?;
    Ok(HttpResponse::Created().json(ApiKeyResponse::from(key)))
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Ids of every user, oldest first", body = [String])),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let ids = state.users_query.list_user_ids().await?;
    Ok(HttpResponse::Ok().json(ids))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let user = state.users_query.find_user(id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Replace a user's email and password.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such user", body = Error),
        (status = 409, description = "Email already used or concurrent update", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let credentials = credentials(payload.into_inner())?;
    let user = state.users.update_user(id, credentials).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Delete a user with its keys, ACLs and limits.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.users.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Revoke every key of a user.
#[utoipa::path(
    delete,
    path = "/users/sessions/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "Keys revoked"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[delete("/users/sessions/{id}")]
pub async fn logout(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.users.logout(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiKey, PasswordHash, User};
    use crate::inbound::http::test_utils::{TestPorts, test_state};
    use crate::test_support::epoch;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::TimeDelta;
    use rstest::rstest;
    use serde_json::Value;

    fn user(id: Uuid, email: &str) -> User {
        User {
            id,
            email: email.to_owned(),
            password: PasswordHash::new("secret"),
            created_at: epoch(),
            updated_at: epoch(),
            version: 1,
        }
    }

    async fn call(ports: TestPorts, req: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(ports)))
                .service(create_user)
                .service(login)
                .service(login_by_id)
                .service(list_users)
                .service(get_user)
                .service(update_user)
                .service(delete_user)
                .service(logout),
        )
        .await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let bytes = actix_test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn create_user_never_echoes_the_password() {
        let id = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_create_user()
            .withf(|creds| creds.email() == "ada@example.com" && creds.password() == "secret")
            .returning(move |creds| Ok(user(id, creds.email())));
        let req = actix_test::TestRequest::post()
            .uri("/users")
            .set_json(json!({ "email": " ada@example.com ", "password": "secret" }));

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["id"], id.to_string());
        assert!(body.get("password").is_none());
    }

    #[rstest]
    #[case::missing_email(json!({ "password": "secret" }), "email")]
    #[case::missing_password(json!({ "email": "ada@example.com" }), "password")]
    #[case::bad_email(json!({ "email": "ada", "password": "secret" }), "email")]
    #[case::empty_password(json!({ "email": "ada@example.com", "password": "" }), "password")]
    #[actix_web::test]
    async fn bad_credentials_are_rejected_before_the_service(
        #[case] payload: Value,
        #[case] field: &str,
    ) {
        let mut ports = TestPorts::default();
        ports.users.expect_create_user().never();
        let req = actix_test::TestRequest::post()
            .uri("/users")
            .set_json(payload);

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_returns_the_issued_key() {
        let user_id = Uuid::new_v4();
        let key = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports.users.expect_login().returning(move |_| {
            Ok(ApiKey {
                id: Uuid::new_v4(),
                key,
                api_user: user_id,
                valid_until: epoch() + TimeDelta::hours(1),
            })
        });
        let req = actix_test::TestRequest::post()
            .uri("/users/sessions")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }));

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["key"], key.to_string());
        assert_eq!(body["user"], user_id.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_login()
            .returning(|_| Err(Error::unauthorized("Invalid credentials")));
        let req = actix_test::TestRequest::post()
            .uri("/users/sessions")
            .set_json(json!({ "email": "ada@example.com", "password": "nope" }));

        let (status, _) = call(ports, req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn sessions_path_is_not_taken_for_a_user_id() {
        let id = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports.users.expect_logout().never();
        ports
            .users
            .expect_login_by_id()
            .withf(move |candidate| *candidate == id)
            .returning(|candidate| {
                Ok(ApiKey {
                    id: Uuid::new_v4(),
                    key: Uuid::new_v4(),
                    api_user: candidate,
                    valid_until: epoch() + TimeDelta::hours(1),
                })
            });
        let req = actix_test::TestRequest::post().uri(&format!("/users/sessions/{id}"));

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"], id.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn update_forwards_id_and_credentials() {
        let id = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_update_user()
            .withf(move |candidate, creds| *candidate == id && creds.email() == "new@example.com")
            .returning(|candidate, creds| Ok(user(candidate, creds.email())));
        let req = actix_test::TestRequest::patch()
            .uri(&format!("/users/{id}"))
            .set_json(json!({ "email": "new@example.com", "password": "other" }));

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "new@example.com");
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_user_id_is_rejected() {
        let mut ports = TestPorts::default();
        ports.users_query.expect_find_user().never();
        let req = actix_test::TestRequest::get().uri("/users/not-a-uuid");

        let (status, body) = call(ports, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "id");
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_replies_without_content() {
        let id = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_logout()
            .withf(move |candidate| *candidate == id)
            .times(1)
            .returning(|_| Ok(()));

        let (status, body) = call(
            ports,
            actix_test::TestRequest::delete().uri(&format!("/users/sessions/{id}")),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_user_replies_without_content() {
        let id = Uuid::new_v4();
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_delete_user()
            .withf(move |candidate| *candidate == id)
            .times(1)
            .returning(|_| Ok(()));

        let (status, _) = call(
            ports,
            actix_test::TestRequest::delete().uri(&format!("/users/{id}")),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn list_users_returns_ids() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let expected = ids.clone();
        let mut ports = TestPorts::default();
        ports
            .users_query
            .expect_list_user_ids()
            .returning(move || Ok(ids.clone()));

        let (status, body) = call(ports, actix_test::TestRequest::get().uri("/users")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(expected));
    }
}
