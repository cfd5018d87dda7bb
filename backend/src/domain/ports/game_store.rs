//! Driven port over the planet rows, used inside one store transaction.
//!
//! A [`GameTransaction`] wraps exactly one database transaction. Its
//! [`timestamp`](GameTransaction::timestamp) is the server time captured when
//! the transaction started and is the authoritative "now" of everything done
//! through it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::game::{
    GameError, PendingAction, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, PlanetSnapshot, Upsert,
};

/// Factory for store transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn GameTransaction>, GameError>;

    /// Check that the store answers.
    async fn ping(&self) -> Result<(), GameError>;
}

/// Read/write primitives over the rows a planet owns.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// its writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameTransaction: Send {
    /// Server time captured when the transaction began.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Lock the planet row until the transaction ends.
    ///
    /// Fails with [`GameError::NoSuchPlanet`] when the planet does not exist.
    async fn lock_planet(&mut self, planet: Uuid) -> Result<(), GameError>;

    /// Load the planet rows, its pending actions and its universe catalogue.
    async fn load_planet_snapshot(&mut self, planet: Uuid) -> Result<PlanetSnapshot, GameError>;

    /// Versioned update of stockpiles; a stale version fails with
    /// [`GameError::OptimisticLock`].
    async fn persist_resource_updates(&mut self, rows: &[PlanetResource])
    -> Result<(), GameError>;

    async fn persist_production_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceProduction>],
    ) -> Result<(), GameError>;

    async fn persist_storage_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceStorage>],
    ) -> Result<(), GameError>;

    async fn persist_building_levels(
        &mut self,
        rows: &[Upsert<PlanetBuilding>],
    ) -> Result<(), GameError>;

    /// Insert an action with its cost, production and storage rows.
    ///
    /// A second action on the same building fails with
    /// [`GameError::DuplicateAction`].
    async fn insert_action(&mut self, pending: &PendingAction) -> Result<(), GameError>;

    async fn find_action(&mut self, action: Uuid) -> Result<Option<PendingAction>, GameError>;

    /// Remove an action and its snapshot rows; a missing action fails with
    /// [`GameError::NoMatchingRows`].
    async fn delete_action_and_snapshots(&mut self, action: Uuid) -> Result<(), GameError>;

    async fn commit(&mut self) -> Result<(), GameError>;

    async fn rollback(&mut self) -> Result<(), GameError>;
}
