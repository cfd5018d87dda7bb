//! Catch-up entry point used before a request touches a planet.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catch_up::{CatchUpPlan, advance};
use super::game::GameError;
use super::gate::PlanetGate;
use super::ports::{GameStore, PlanetCatchUp};
use super::transaction::{finish, with_conflict_retry};
use crate::domain::Error;

/// Runs the catch-up engine for one planet under its gate.
#[derive(Clone)]
pub struct CatchUpService<S> {
    store: Arc<S>,
    gate: Arc<PlanetGate>,
}

impl<S> CatchUpService<S> {
    pub fn new(store: Arc<S>, gate: Arc<PlanetGate>) -> Self {
        Self { store, gate }
    }
}

impl<S> CatchUpService<S>
where
    S: GameStore,
{
    /// Advance `planet` to at least `now`, holding its gate until the
    /// transaction has ended.
    ///
    /// # Errors
    ///
    /// Gate failures, [`GameError::NoSuchPlanet`], store failures, and
    /// [`GameError::OptimisticLock`] once retries are exhausted.
    pub async fn catch_up_planet(
        &self,
        planet: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CatchUpPlan, GameError> {
        let _permit = self.gate.acquire(planet).await?;
        with_conflict_retry(move || self.catch_up_once(planet, now)).await
    }

    async fn catch_up_once(
        &self,
        planet: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CatchUpPlan, GameError> {
        let mut tx = self.store.begin().await?;
        let result = advance(tx.as_mut(), planet, now).await;
        finish(tx.as_mut(), result).await
    }
}

#[async_trait]
impl<S> PlanetCatchUp for CatchUpService<S>
where
    S: GameStore,
{
    async fn catch_up(&self, planet: Uuid, now: DateTime<Utc>) -> Result<(), Error> {
        self.catch_up_planet(planet, now)
            .await
            .map(|_| ())
            .map_err(Error::from)
    }
}
