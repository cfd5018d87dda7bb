//! Gateway authorization check.
//!
//! ```text
//! GET /auth
//! ```
//!
//! A gateway forwards the caller's `X-Api-Key` here before routing a game
//! call. On success the reply is empty and carries the owner's ACLs in
//! `X-Acl` and limits in `X-User-Limit`, both as JSON arrays.

use actix_web::http::header::HeaderValue;
use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Serialize;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::middleware::api_key::extract_key;

pub const ACL_HEADER: &str = "X-Acl";
pub const USER_LIMIT_HEADER: &str = "X-User-Limit";

fn json_header<T: Serialize>(value: &T) -> Result<HeaderValue, Error> {
    let raw = serde_json::to_string(value)
        .map_err(|err| Error::internal(format!("failed to encode header: {err}")))?;
    HeaderValue::from_str(&raw)
        .map_err(|err| Error::internal(format!("invalid header value: {err}")))
}

#[utoipa::path(
    get,
    path = "/auth",
    responses(
        (status = 204, description = "Key accepted; ACLs and limits in headers",
            headers(
                ("X-Acl" = String, description = "JSON array of ACLs"),
                ("X-User-Limit" = String, description = "JSON array of limits")
            )),
        (status = 400, description = "Missing or malformed key", body = Error),
        (status = 403, description = "Unknown or expired key", body = Error)
    ),
    tags = ["auth"],
    operation_id = "authorize"
)]
#[get("/auth")]
pub async fn authorize(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let key = extract_key(req.headers())?;
    let authorization = state.authorizer.authorize(key).await?;
    Ok(HttpResponse::NoContent()
        .insert_header((ACL_HEADER, json_header(&authorization.acls)?))
        .insert_header((USER_LIMIT_HEADER, json_header(&authorization.limits)?))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Acl, Authorization, Limit};
    use crate::inbound::http::test_utils::{TestPorts, test_state};
    use crate::middleware::API_KEY_HEADER;
    use crate::test_support::epoch;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    async fn call(
        ports: TestPorts,
        req: actix_test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(ports)))
                .service(authorize),
        )
        .await;
        actix_test::call_service(&app, req.uri("/auth").to_request()).await
    }

    fn header_json(res: &actix_web::dev::ServiceResponse, name: &str) -> Value {
        let raw = res
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_else(|| panic!("missing {name}"));
        serde_json::from_str(raw).expect("JSON header")
    }

    #[rstest]
    #[actix_web::test]
    async fn accepted_key_exposes_acls_and_limits() {
        let key = Uuid::new_v4();
        let user = Uuid::new_v4();
        let acl = Acl {
            id: Uuid::new_v4(),
            user,
            resource: "universes".to_owned(),
            permissions: vec!["GET".to_owned(), "POST".to_owned()],
            created_at: epoch(),
        };
        let expected_acl = acl.clone();
        let mut ports = TestPorts::default();
        ports
            .authorizer
            .expect_authorize()
            .withf(move |candidate| *candidate == key)
            .returning(move |_| {
                Ok(Authorization {
                    acls: vec![acl.clone()],
                    limits: vec![Limit {
                        name: "players".to_owned(),
                        value: "3".to_owned(),
                    }],
                })
            });
        let req = actix_test::TestRequest::get().insert_header((API_KEY_HEADER, key.to_string()));

        let res = call(ports, req).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let acls = header_json(&res, ACL_HEADER);
        assert_eq!(acls[0]["resource"], "universes");
        assert_eq!(acls[0]["user"], user.to_string());
        assert_eq!(acls[0]["id"], expected_acl.id.to_string());
        assert_eq!(acls[0]["permissions"], json!(["GET", "POST"]));
        assert_eq!(
            header_json(&res, USER_LIMIT_HEADER),
            json!([{ "name": "players", "value": "3" }])
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn owner_without_grants_gets_empty_arrays() {
        let mut ports = TestPorts::default();
        ports
            .authorizer
            .expect_authorize()
            .returning(|_| Ok(Authorization::default()));
        let req = actix_test::TestRequest::get()
            .insert_header((API_KEY_HEADER, Uuid::new_v4().to_string()));

        let res = call(ports, req).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(header_json(&res, ACL_HEADER), json!([]));
        assert_eq!(header_json(&res, USER_LIMIT_HEADER), json!([]));
    }

    #[rstest]
    #[case::missing(actix_test::TestRequest::get())]
    #[case::malformed(actix_test::TestRequest::get().insert_header((API_KEY_HEADER, "nope")))]
    #[actix_web::test]
    async fn bad_key_header_is_a_bad_request(#[case] req: actix_test::TestRequest) {
        let mut ports = TestPorts::default();
        ports.authorizer.expect_authorize().never();

        let res = call(ports, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_key_is_forbidden() {
        let mut ports = TestPorts::default();
        ports
            .authorizer
            .expect_authorize()
            .returning(|_| Err(Error::forbidden("Authentication expired")));
        let req = actix_test::TestRequest::get()
            .insert_header((API_KEY_HEADER, Uuid::new_v4().to_string()));

        let res = call(ports, req).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
