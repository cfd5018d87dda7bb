//! Process-wide token bucket throttling.
//!
//! The bucket starts full. Each request takes one token; tokens refill
//! continuously at a fixed rate up to the capacity. An empty bucket
//! answers 429 without reaching the handler.

use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::{Either, LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::Error as DomainError;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    refilled_at: Instant,
}

/// Token bucket shared by every worker.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    #[must_use]
    pub fn new(capacity: u32, refill_per_second: u32) -> Self {
        Self::starting_at(capacity, refill_per_second, Instant::now())
    }

    fn starting_at(capacity: u32, refill_per_second: u32, now: Instant) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_second: f64::from(refill_per_second),
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                refilled_at: now,
            }),
        }
    }

    /// Take one token as of `now`; `false` when the bucket is empty.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = now.saturating_duration_since(state.refilled_at).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
        state.refilled_at = now;
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

/// Middleware factory rejecting requests once the bucket runs dry.
#[derive(Clone, Debug)]
pub struct Throttle {
    bucket: Arc<TokenBucket>,
}

impl Throttle {
    #[must_use]
    pub fn new(bucket: Arc<TokenBucket>) -> Self {
        Self { bucket }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Throttle
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ThrottleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ThrottleMiddleware {
            service,
            bucket: Arc::clone(&self.bucket),
        }))
    }
}

/// Service wrapper produced by [`Throttle`].
pub struct ThrottleMiddleware<S> {
    service: S,
    bucket: Arc<TokenBucket>,
}

impl<S, B> Service<ServiceRequest> for ThrottleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Either<
        LocalBoxFuture<'static, Result<Self::Response, Self::Error>>,
        Ready<Result<Self::Response, Self::Error>>,
    >;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.bucket.try_acquire() {
            debug!(path = req.path(), "request throttled");
            let response = req
                .error_response(DomainError::too_many_requests("Throttled"))
                .map_into_right_body();
            return Either::Right(ready(Ok(response)));
        }
        let fut = self.service.call(req);
        Either::Left(Box::pin(async move {
            fut.await.map(ServiceResponse::map_into_left_body)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    fn bucket_drains_and_refills() {
        let start = Instant::now();
        let bucket = TokenBucket::starting_at(2, 1, start);
        assert!(bucket.try_acquire_at(start));
        assert!(bucket.try_acquire_at(start));
        assert!(!bucket.try_acquire_at(start));
        assert!(!bucket.try_acquire_at(start + Duration::from_millis(500)));
        assert!(bucket.try_acquire_at(start + Duration::from_millis(1_000)));
    }

    #[rstest]
    fn refill_never_exceeds_capacity() {
        let start = Instant::now();
        let bucket = TokenBucket::starting_at(1, 10, start);
        let later = start + Duration::from_secs(60);
        assert!(bucket.try_acquire_at(later));
        assert!(!bucket.try_acquire_at(later));
    }

    #[actix_web::test]
    async fn empty_bucket_answers_429() {
        let bucket = Arc::new(TokenBucket::new(1, 0));
        let app = actix_test::init_service(
            App::new()
                .wrap(Throttle::new(bucket))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let first = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        let second = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: DomainError = actix_test::read_body_json(second).await;
        assert_eq!(body.message(), "Throttled");
    }
}
