//! `X-Api-Key` authentication for game routes.
//!
//! A missing, repeated or malformed header is rejected with 400. Keys the
//! authenticator does not accept are rejected with 401. The accepted
//! [`ApiKey`] is stored in the request extensions.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderMap;
use actix_web::{Error, HttpMessage, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ApiKey, Error as DomainError};
use crate::inbound::http::state::HttpState;

/// Header carrying the caller's key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

fn key_error(message: &str) -> DomainError {
    DomainError::invalid_request(message).with_details(json!({ "header": API_KEY_HEADER }))
}

/// The single well-formed key in `headers`, or a 400 naming the header.
pub(crate) fn extract_key(headers: &HeaderMap) -> Result<Uuid, DomainError> {
    let mut values = headers.get_all(API_KEY_HEADER);
    let value = values
        .next()
        .ok_or_else(|| key_error("API key is required"))?;
    if values.next().is_some() {
        return Err(key_error("Only one API key may be supplied"));
    }
    value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| key_error("API key must be a valid UUID"))
}

async fn authenticate(req: &ServiceRequest) -> Result<ApiKey, DomainError> {
    let key = extract_key(req.headers())?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| DomainError::internal("HTTP state is not registered"))?;
    state.authenticator.authenticate(key).await
}

/// Middleware factory enforcing API key authentication.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequireApiKey;

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiKeyMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service wrapper produced by [`RequireApiKey`].
pub struct RequireApiKeyMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyMiddleware<S>
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
            match authenticate(&req).await {
                Ok(key) => {
                    debug!(api_user = %key.api_user, "request authenticated");
                    req.extensions_mut().insert(key);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(error) => Ok(req.error_response(error).map_into_right_body()),
            }
        })
    }
}
