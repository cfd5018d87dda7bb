//! Response envelope wrapping every body as
//! `{"RequestId": ..., "Status": "SUCCESS" | "ERROR", "Details": ...}`.
//!
//! `Status` is `ERROR` for any status outside 200-299. Responses to `HEAD`
//! and `204 No Content` carry no body and pass through untouched. Bodies
//! that are not JSON are wrapped as a JSON string. Errors raised by inner
//! middleware stay errors, carrying an enveloped response.

use std::task::{Context, Poll};

use actix_web::body::{BoxBody, EitherBody, MessageBody, to_bytes};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::error::InternalError;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{Error as DomainError, TraceId};

/// Outcome reported in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Wire shape of every enveloped response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    pub request_id: String,
    pub status: EnvelopeStatus,
    pub details: Value,
}

impl Envelope {
    fn new(status: StatusCode, details: Value) -> Self {
        let request_id = TraceId::current().unwrap_or_else(TraceId::generate);
        Self {
            request_id: request_id.to_string(),
            status: if status.is_success() {
                EnvelopeStatus::Success
            } else {
                EnvelopeStatus::Error
            },
            details,
        }
    }
}

fn passes_through(method: &Method, status: StatusCode) -> bool {
    method == Method::HEAD || status == StatusCode::NO_CONTENT
}

fn details_from(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Middleware factory for the response envelope.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseEnvelope;

impl<S, B> Transform<S, ServiceRequest> for ResponseEnvelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ResponseEnvelopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResponseEnvelopeMiddleware { service }))
    }
}

/// Service wrapper produced by [`ResponseEnvelope`].
pub struct ResponseEnvelopeMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ResponseEnvelopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = match fut.await {
                Ok(res) => res,
                Err(error) => {
                    let response = enveloped(error.error_response()).await;
                    return Err(InternalError::from_response(error.to_string(), response).into());
                }
            };
            if passes_through(&method, res.status()) {
                return Ok(res.map_into_left_body());
            }
            let (request, response) = res.into_parts();
            let response = enveloped(response).await;
            Ok(ServiceResponse::new(request, response).map_into_right_body())
        })
    }
}

/// Re-encode the body of `response` inside an [`Envelope`].
async fn enveloped<B>(response: HttpResponse<B>) -> HttpResponse<BoxBody>
where
    B: MessageBody + 'static,
{
    let status = response.status();
    let (head, body) = response.into_parts();
    let bytes = match to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            let error: Box<dyn std::error::Error> = error.into();
            warn!(%error, "failed to read response body for the envelope");
            let fallback = DomainError::internal("Internal server error");
            let envelope = Envelope::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::to_value(&fallback).unwrap_or(Value::Null),
            );
            return HttpResponse::InternalServerError().json(envelope);
        }
    };
    let envelope = Envelope::new(status, details_from(&bytes));
    let encoded = serde_json::to_vec(&envelope).unwrap_or_default();
    let mut response = head.set_body(BoxBody::new(encoded));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
