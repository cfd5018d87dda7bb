//! Correlation identifier for one request.
//!
//! The trace middleware puts a [`TraceId`] in task-local scope before any
//! other middleware runs. Log lines, error payloads, the `trace-id` response
//! header and the envelope's `RequestId` all read it from there. A caller
//! that already sends a `trace-id` UUID keeps it.
//!
//! Spawned tasks do not inherit task-locals; wrap their futures in
//! [`TraceId::scope`].

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Request and response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID naming one request across logs and responses.
///
/// # Examples
/// ```
/// use stellar_backend::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id = TraceId::from_uuid(uuid::Uuid::nil());
/// let observed = TraceId::scope(trace_id, async { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Reuse an upstream identifier when it is a UUID, otherwise mint one.
    #[must_use]
    pub fn inherit_or_generate(upstream: Option<&str>) -> Self {
        upstream
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map_or_else(Self::generate, Self)
    }

    /// Identifier in scope for the running task.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Synchronous counterpart of [`TraceId::scope`], for the part of a
    /// middleware call that runs before its future is first polled.
    pub fn scope_sync<F, R>(trace_id: TraceId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        TRACE_ID.sync_scope(trace_id, f)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
