//! Route-level middleware that brings a planet up to date before its
//! handler runs.
//!
//! The planet comes from the `{id}` path segment. A missing or malformed id
//! is rejected with 400 without touching the engine. When catch-up fails,
//! the mapped error is returned and the handler is not invoked.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;
use uuid::Uuid;

use crate::domain::Error as DomainError;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const ID: FieldName = FieldName::new("id");

/// Middleware factory, applied per route with `wrap = "GameUpdateWatcher"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameUpdateWatcher;

impl<S, B> Transform<S, ServiceRequest> for GameUpdateWatcher
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GameUpdateWatcherMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GameUpdateWatcherMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service wrapper produced by [`GameUpdateWatcher`].
pub struct GameUpdateWatcherMiddleware<S> {
    service: Rc<S>,
}

fn planet_of(req: &ServiceRequest) -> Result<Uuid, DomainError> {
    let raw = req
        .match_info()
        .get("id")
        .ok_or_else(|| missing_field_error(ID))?;
    parse_uuid(raw, ID)
}

async fn catch_up(req: &ServiceRequest) -> Result<(), DomainError> {
    let planet = planet_of(req)?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| DomainError::internal("HTTP state is not registered"))?;
    let now = state.clock.utc();
    debug!(%planet, %now, "catching up planet before handler");
    state.catch_up.catch_up(planet, now).await
}

impl<S, B> Service<ServiceRequest> for GameUpdateWatcherMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            if let Err(error) = catch_up(&req).await {
                return Ok(req.error_response(error).map_into_right_body());
            }
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}
