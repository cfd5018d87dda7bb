//! Server construction and middleware wiring.
//!
//! Middleware runs outermost first: trace, response envelope, panic
//! recovery, throttling, then API key authentication for every game route.
//! Registration, login and the gateway check sit before the keyed scope
//! because they hand out or inspect keys themselves. The planet watcher is
//! attached per route by the handlers themselves.

mod config;
mod state_builders;

pub use config::{ServiceSettings, SettingsSource};
pub use state_builders::{StoreAdapters, build_diesel_state, build_http_state, build_memory_state};

use std::future::Future;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{Error, PlanetGate};
use crate::inbound::http::actions::{create_action, delete_action};
use crate::inbound::http::auth::authorize;
use crate::inbound::http::health::healthcheck;
use crate::inbound::http::planets::{create_planet, delete_planet, get_planet, list_planets};
use crate::inbound::http::players::{create_player, delete_player, get_player, list_players};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::universes::{
    create_universe, delete_universe, get_resource, get_universe, list_resources, list_universes,
};
use crate::inbound::http::users::{
    create_user, delete_user, get_user, list_users, login, login_by_id, logout, update_user,
};
use crate::middleware::{Recover, RequireApiKey, ResponseEnvelope, Throttle, TokenBucket, Trace};

/// Everything one app instance needs; cloned into every worker.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub base_path: String,
    pub bucket: Arc<TokenBucket>,
}

fn json_error(err: actix_web::error::JsonPayloadError, _: &actix_web::HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _: &actix_web::HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

/// Build the application: game routes under the base path plus Swagger UI
/// in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        base_path,
        bucket,
    } = deps;

    let keyed = web::scope("")
        .wrap(RequireApiKey)
        .service(create_universe)
        .service(list_universes)
        .service(get_universe)
        .service(delete_universe)
        .service(list_resources)
        .service(get_resource)
        .service(create_player)
        .service(list_players)
        .service(get_player)
        .service(delete_player)
        .service(create_planet)
        .service(list_planets)
        .service(get_planet)
        .service(delete_planet)
        .service(create_action)
        .service(delete_action)
        .service(list_users)
        .service(logout)
        .service(get_user)
        .service(update_user)
        .service(delete_user);

    // Method guards let keyed routes on the same paths fall through.
    let api = web::scope(&base_path)
        .wrap(Throttle::new(bucket))
        .wrap(Recover)
        .wrap(ResponseEnvelope)
        .wrap(Trace)
        .service(healthcheck)
        .service(create_user)
        .service(login)
        .service(login_by_id)
        .service(authorize)
        .service(keyed);

    let app = App::new()
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error));

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::for_base_path(&base_path)),
    );

    app.service(api)
}

/// Bind and start the HTTP server without its own signal handling; drive it
/// with [`serve_until`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(deps: AppDependencies, settings: &ServiceSettings) -> std::io::Result<Server> {
    let server = HttpServer::new(move || build_app(deps.clone()))
        .shutdown_timeout(settings.shutdown_timeout().as_secs())
        .disable_signals()
        .bind(settings.bind_addr())?
        .run();
    Ok(server)
}

/// Run `server` until it exits or `shutdown` completes.
///
/// On shutdown the gate closes before the graceful stop begins, so requests
/// queued on a planet fail fast instead of holding the drain open.
///
/// # Errors
/// Whatever the server itself returns.
pub async fn serve_until<F>(server: Server, gate: Arc<PlanetGate>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let handle = server.handle();
    tokio::pin!(server);
    tokio::select! {
        result = &mut server => {
            gate.close();
            return result;
        }
        () = shutdown => {}
    }
    info!("shutdown requested; cancelling planet waiters");
    gate.close();
    // `stop` queues the command eagerly; the server must keep being polled
    // to act on it.
    let (result, ()) = tokio::join!(server, handle.stop(true));
    result
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::middleware::API_KEY_HEADER;
    use crate::test_support::{MutableClock, epoch};
    use actix_web::http::{Method, StatusCode};
    use actix_web::test::{self as actix_test, TestRequest};
    use chrono::TimeDelta;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::time::Duration;
    use uuid::Uuid;

    const BASE: &str = "/v1/stellar";

    fn deps() -> AppDependencies {
        let clock = Arc::new(MutableClock::new(epoch()));
        let gate = Arc::new(PlanetGate::default());
        let (state, _) = build_memory_state(gate, clock, TimeDelta::hours(1));
        AppDependencies {
            http_state: web::Data::new(state),
            base_path: BASE.to_owned(),
            bucket: Arc::new(TokenBucket::new(100, 100)),
        }
    }

    async fn send(req: TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(build_app(deps())).await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let bytes = actix_test::read_body(res).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn healthcheck_is_served_through_the_whole_stack() {
        let (status, body) =
            send(TestRequest::get().uri(&format!("{BASE}/healthcheck"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Status"], "SUCCESS");
        assert_eq!(body["Details"], "OK");
    }

    #[rstest]
    #[case::list_universes(Method::GET, "/universes")]
    #[case::list_users(Method::GET, "/users")]
    #[case::logout(Method::DELETE, "/users/sessions/00000000-0000-0000-0000-000000000000")]
    #[actix_web::test]
    async fn keyed_routes_refuse_anonymous_callers(#[case] method: Method, #[case] path: &str) {
        let (status, body) =
            send(TestRequest::default().method(method).uri(&format!("{BASE}{path}"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["Status"], "ERROR");
        assert_eq!(body["Details"]["details"]["header"], API_KEY_HEADER);
    }

    #[rstest]
    #[actix_web::test]
    async fn registration_and_login_need_no_key() {
        let app = actix_test::init_service(build_app(deps())).await;
        let credentials = json!({ "email": "ada@example.com", "password": "secret" });

        let res = actix_test::call_service(
            &app,
            TestRequest::post()
                .uri(&format!("{BASE}/users"))
                .set_json(&credentials)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            TestRequest::post()
                .uri(&format!("{BASE}/users/sessions"))
                .set_json(&credentials)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        let key = body["Details"]["key"].as_str().expect("issued key").to_owned();

        let res = actix_test::call_service(
            &app,
            TestRequest::get()
                .uri(&format!("{BASE}/users"))
                .insert_header((API_KEY_HEADER, key))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn shutdown_closes_the_gate_and_stops_the_server() {
        let gate = Arc::new(PlanetGate::new(Duration::from_secs(5)));
        let server = HttpServer::new(App::new)
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("bind")
            .run();

        serve_until(server, Arc::clone(&gate), async {})
            .await
            .expect("clean stop");

        let err = gate.acquire(Uuid::new_v4()).await.expect_err("closed gate");
        assert_eq!(Error::from(err).code(), ErrorCode::ClientClosedRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn waiters_are_released_as_soon_as_shutdown_starts() {
        let gate = Arc::new(PlanetGate::new(Duration::from_secs(30)));
        let planet = Uuid::new_v4();
        let held = gate.acquire(planet).await.expect("free planet");
        let waiter = {
            let gate = Arc::clone(&gate);
            actix_web::rt::spawn(async move { gate.acquire(planet).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let server = HttpServer::new(App::new)
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("bind")
            .run();
        serve_until(server, Arc::clone(&gate), async {})
            .await
            .expect("clean stop");

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter released promptly")
            .expect("task joined");
        assert!(outcome.is_err());
        drop(held);
    }
}
