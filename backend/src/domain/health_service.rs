//! Store liveness check behind `/healthcheck`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{GameStore, HealthProbe};

#[derive(Clone)]
pub struct StoreHealthProbe<S> {
    store: Arc<S>,
}

impl<S> StoreHealthProbe<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> HealthProbe for StoreHealthProbe<S>
where
    S: GameStore,
{
    async fn check(&self) -> Result<(), Error> {
        self.store.ping().await.map_err(|error| {
            warn!(%error, "health check failed");
            Error::service_unavailable("store unavailable")
        })
    }
}
