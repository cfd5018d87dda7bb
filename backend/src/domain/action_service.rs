//! Building action use-cases.
//!
//! Both operations bring the planet up to date first, inside the same
//! transaction and under the planet gate, so costs are checked and refunded
//! against current stockpiles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use super::catch_up::advance;
use super::game::{BuildingAction, GameError, credit_costs, debit_costs, derive_action, validate_action};
use super::gate::PlanetGate;
use super::ports::{BuildingActionCommand, GameStore, GameTransaction};
use super::transaction::{finish, with_conflict_retry};
use crate::domain::Error;

/// Service implementing [`BuildingActionCommand`].
#[derive(Clone)]
pub struct BuildingActionService<S> {
    store: Arc<S>,
    gate: Arc<PlanetGate>,
    clock: Arc<dyn Clock>,
}

impl<S> BuildingActionService<S> {
    pub fn new(store: Arc<S>, gate: Arc<PlanetGate>, clock: Arc<dyn Clock>) -> Self {
        Self { store, gate, clock }
    }
}

async fn create_in(
    tx: &mut dyn GameTransaction,
    planet: Uuid,
    building: Uuid,
    now: DateTime<Utc>,
) -> Result<BuildingAction, GameError> {
    let created_at = now.max(tx.timestamp());
    advance(tx, planet, created_at).await?;

    let mut snapshot = tx.load_planet_snapshot(planet).await?;
    let pending = derive_action(&snapshot, building, created_at)?;
    validate_action(&snapshot, &pending)?;
    let debited = debit_costs(&mut snapshot, &pending)?;
    tx.persist_resource_updates(&debited).await?;
    tx.insert_action(&pending).await?;
    Ok(pending.action)
}

async fn delete_in(
    tx: &mut dyn GameTransaction,
    planet: Uuid,
    action: Uuid,
    now: DateTime<Utc>,
) -> Result<(), GameError> {
    advance(tx, planet, now).await?;

    // The catch-up above may have completed the action.
    let pending = tx
        .find_action(action)
        .await?
        .ok_or_else(GameError::no_matching_rows)?;
    let mut snapshot = tx.load_planet_snapshot(planet).await?;
    let credited = credit_costs(&mut snapshot, &pending)?;
    tx.persist_resource_updates(&credited).await?;
    tx.delete_action_and_snapshots(action).await
}

impl<S> BuildingActionService<S>
where
    S: GameStore,
{
    /// Start the next level of `building` on `planet`.
    ///
    /// # Errors
    ///
    /// [`GameError::NoSuchPlanet`], [`GameError::NoSuchBuilding`],
    /// [`GameError::NotEnoughResources`], [`GameError::DuplicateAction`],
    /// gate and store failures.
    pub async fn start_upgrade(
        &self,
        planet: Uuid,
        building: Uuid,
    ) -> Result<BuildingAction, GameError> {
        let _permit = self.gate.acquire(planet).await?;
        let action = with_conflict_retry(move || self.create_once(planet, building)).await?;
        info!(
            %planet,
            %building,
            action = %action.id,
            level = action.desired_level,
            completed_at = %action.completed_at,
            "building action created"
        );
        Ok(action)
    }

    /// Cancel `action` and refund what it cost.
    ///
    /// # Errors
    ///
    /// [`GameError::NoMatchingRows`] when the action does not exist or has
    /// completed by now, gate and store failures.
    pub async fn cancel_upgrade(&self, action: Uuid) -> Result<(), GameError> {
        let planet = self.planet_of(action).await?;
        let _permit = self.gate.acquire(planet).await?;
        with_conflict_retry(move || self.delete_once(planet, action)).await?;
        info!(%planet, %action, "building action cancelled");
        Ok(())
    }

    async fn planet_of(&self, action: Uuid) -> Result<Uuid, GameError> {
        let mut tx = self.store.begin().await?;
        let found = tx.find_action(action).await;
        finish(tx.as_mut(), found)
            .await?
            .map(|pending| pending.action.planet)
            .ok_or_else(GameError::no_matching_rows)
    }

    async fn create_once(&self, planet: Uuid, building: Uuid) -> Result<BuildingAction, GameError> {
        let mut tx = self.store.begin().await?;
        let result = create_in(tx.as_mut(), planet, building, self.clock.utc()).await;
        finish(tx.as_mut(), result).await
    }

    async fn delete_once(&self, planet: Uuid, action: Uuid) -> Result<(), GameError> {
        let mut tx = self.store.begin().await?;
        let result = delete_in(tx.as_mut(), planet, action, self.clock.utc()).await;
        finish(tx.as_mut(), result).await
    }
}

#[async_trait]
impl<S> BuildingActionCommand for BuildingActionService<S>
where
    S: GameStore,
{
    async fn create_action(&self, planet: Uuid, building: Uuid) -> Result<BuildingAction, Error> {
        self.start_upgrade(planet, building)
            .await
            .map_err(Error::from)
    }

    async fn delete_action(&self, action: Uuid) -> Result<(), Error> {
        self.cancel_upgrade(action).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "action_service_tests.rs"]
mod tests;
