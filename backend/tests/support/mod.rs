//! Shared harness for HTTP integration tests.
//!
//! Builds the full application on the in-memory store with a hand-driven
//! clock and one seeded API key.

#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::web;
use chrono::TimeDelta;
use serde_json::{Value, json};
use uuid::Uuid;

use stellar_backend::domain::{ApiKey, PlanetGate};
use stellar_backend::middleware::{API_KEY_HEADER, TokenBucket};
use stellar_backend::outbound::memory::MemoryStore;
use stellar_backend::server::{AppDependencies, build_app, build_memory_state};
use stellar_backend::test_support::{MutableClock, epoch};

pub const BASE: &str = "/v1/stellar";

/// Everything a test needs to drive and inspect the app.
pub struct Harness {
    pub clock: Arc<MutableClock>,
    pub store: Arc<MemoryStore>,
    pub gate: Arc<PlanetGate>,
    pub key: ApiKey,
    pub deps: AppDependencies,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_bucket(TokenBucket::new(1_000, 1_000)).await
    }

    pub async fn with_bucket(bucket: TokenBucket) -> Self {
        let clock = Arc::new(MutableClock::new(epoch()));
        let gate = Arc::new(PlanetGate::default());
        let (state, store) =
            build_memory_state(Arc::clone(&gate), clock.clone(), TimeDelta::hours(1));
        let key = ApiKey {
            id: Uuid::new_v4(),
            key: Uuid::new_v4(),
            api_user: Uuid::new_v4(),
            valid_until: epoch() + TimeDelta::days(30),
        };
        store.insert_api_key(key.clone()).await;
        let deps = AppDependencies {
            http_state: web::Data::new(state),
            base_path: BASE.to_owned(),
            bucket: Arc::new(bucket),
        };
        Self {
            clock,
            store,
            gate,
            key,
            deps,
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        actix_test::init_service(build_app(self.deps.clone())).await
    }

    /// Request builder for `path` under the base path, carrying the API key.
    pub fn request(&self, method: actix_web::http::Method, path: &str) -> TestRequest {
        TestRequest::default()
            .method(method)
            .uri(&format!("{BASE}{path}"))
            .insert_header((API_KEY_HEADER, self.key.key.to_string()))
    }
}

/// Status and decoded envelope of a response; `Value::Null` when the body
/// is empty.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            panic!("body should be JSON ({err}): {}", String::from_utf8_lossy(&bytes))
        })
    };
    (status, body)
}

/// `Details` of an envelope.
pub fn details(envelope: &Value) -> &Value {
    envelope
        .get("Details")
        .unwrap_or_else(|| panic!("envelope without Details: {envelope}"))
}

/// Create a universe, a player in it and return `(universe, player, planet)`
/// ids, the planet being the player's homeworld.
pub async fn seed_player<S, B>(harness: &Harness, app: &S) -> (Value, Value, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    use actix_web::http::Method;

    let (status, body) = send(
        app,
        harness
            .request(Method::POST, "/universes")
            .set_json(json!({ "name": format!("universe-{}", Uuid::new_v4()) }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let universe = details(&body).clone();

    let (status, body) = send(
        app,
        harness
            .request(Method::POST, "/players")
            .set_json(json!({
                "apiUser": harness.key.api_user.to_string(),
                "universe": universe["id"],
                "name": "ada",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let player = details(&body).clone();

    let player_id = player["id"].as_str().unwrap_or_default().to_owned();
    let (status, body) = send(
        app,
        harness
            .request(Method::GET, &format!("/planets?player={player_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let planet = details(&body)[0].clone();

    (universe, player, planet)
}

/// Id of the building named `name` in a full universe body.
pub fn building_id(universe: &Value, name: &str) -> String {
    universe["buildings"]
        .as_array()
        .and_then(|buildings| buildings.iter().find(|b| b["name"] == name))
        .and_then(|b| b["id"].as_str())
        .unwrap_or_else(|| panic!("no building named {name}"))
        .to_owned()
}

/// Id of the resource named `name` in a full universe body.
pub fn resource_id(universe: &Value, name: &str) -> String {
    universe["resources"]
        .as_array()
        .and_then(|resources| resources.iter().find(|r| r["name"] == name))
        .and_then(|r| r["id"].as_str())
        .unwrap_or_else(|| panic!("no resource named {name}"))
        .to_owned()
}

/// Stockpile of `resource` in a full planet body.
pub fn amount(planet: &Value, resource: &str) -> f64 {
    planet["resources"]
        .as_array()
        .and_then(|rows| rows.iter().find(|r| r["resource"] == resource))
        .and_then(|r| r["amount"].as_f64())
        .unwrap_or_else(|| panic!("planet has no resource {resource}"))
}
