//! Transactions over the in-memory state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::MemoryState;
use crate::domain::game::{
    GameError, PendingAction, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, PlanetSnapshot, Upsert,
};
use crate::domain::ports::GameTransaction;

/// Exclusive view of a [`MemoryStore`](super::MemoryStore); writes become
/// visible on [`commit`](GameTransaction::commit).
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    timestamp: DateTime<Utc>,
}

impl MemoryTransaction {
    pub(super) fn new(guard: OwnedMutexGuard<MemoryState>, timestamp: DateTime<Utc>) -> Self {
        let working = guard.clone();
        Self {
            guard,
            working,
            timestamp,
        }
    }
}

trait Versioned {
    fn version(&self) -> i32;
    fn bump(&mut self, now: DateTime<Utc>);
}

// Stockpile rows keep `updated_at` as their integration anchor, so only the
// version moves here.
impl Versioned for PlanetResource {
    fn version(&self) -> i32 {
        self.version
    }

    fn bump(&mut self, _now: DateTime<Utc>) {
        self.version += 1;
    }
}

macro_rules! versioned_with_timestamp {
    ($($row:ty),* $(,)?) => {
        $(
            impl Versioned for $row {
                fn version(&self) -> i32 {
                    self.version
                }

                fn bump(&mut self, now: DateTime<Utc>) {
                    self.version += 1;
                    self.updated_at = now;
                }
            }
        )*
    };
}

versioned_with_timestamp!(PlanetResourceProduction, PlanetResourceStorage, PlanetBuilding);

fn apply_upserts<K, T>(
    table: &mut BTreeMap<K, T>,
    name: &str,
    rows: &[Upsert<T>],
    key: impl Fn(&T) -> K,
    now: DateTime<Utc>,
) -> Result<(), GameError>
where
    K: Ord,
    T: Versioned + Clone,
{
    for upsert in rows {
        match upsert {
            Upsert::Insert(row) => {
                let key = key(row);
                if table.contains_key(&key) {
                    return Err(GameError::optimistic_lock(name));
                }
                table.insert(key, row.clone());
            }
            Upsert::Update(row) => apply_update(table, name, row, key(row), now)?,
        }
    }
    Ok(())
}

fn apply_update<K, T>(
    table: &mut BTreeMap<K, T>,
    name: &str,
    row: &T,
    key: K,
    now: DateTime<Utc>,
) -> Result<(), GameError>
where
    K: Ord,
    T: Versioned + Clone,
{
    match table.get_mut(&key) {
        Some(stored) if stored.version() == row.version() => {
            let mut updated = row.clone();
            updated.bump(now);
            *stored = updated;
            Ok(())
        }
        _ => Err(GameError::optimistic_lock(name)),
    }
}

#[async_trait]
impl GameTransaction for MemoryTransaction {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    async fn lock_planet(&mut self, planet: Uuid) -> Result<(), GameError> {
        // The whole state is already held exclusively.
        if self.working.planets.contains_key(&planet) {
            Ok(())
        } else {
            Err(GameError::no_such_planet(planet))
        }
    }

    async fn load_planet_snapshot(&mut self, planet: Uuid) -> Result<PlanetSnapshot, GameError> {
        let state = &self.working;
        let planet_row = state
            .planets
            .get(&planet)
            .cloned()
            .ok_or_else(|| GameError::no_such_planet(planet))?;
        let universe = state
            .players
            .get(&planet_row.player)
            .map(|player| player.universe)
            .ok_or_else(|| GameError::no_such_planet(planet))?;
        let catalogue = state
            .catalogues
            .get(&universe)
            .cloned()
            .unwrap_or_default();

        Ok(PlanetSnapshot {
            planet: planet_row,
            universe,
            resources: state
                .resources
                .values()
                .filter(|row| row.planet == planet)
                .cloned()
                .collect(),
            productions: state
                .productions
                .values()
                .filter(|row| row.planet == planet)
                .cloned()
                .collect(),
            storages: state
                .storages
                .values()
                .filter(|row| row.planet == planet)
                .cloned()
                .collect(),
            buildings: state
                .buildings
                .values()
                .filter(|row| row.planet == planet)
                .cloned()
                .collect(),
            actions: state
                .actions
                .values()
                .filter(|pending| pending.action.planet == planet)
                .cloned()
                .collect(),
            catalogue,
        })
    }

    async fn persist_resource_updates(
        &mut self,
        rows: &[PlanetResource],
    ) -> Result<(), GameError> {
        let now = self.timestamp;
        for row in rows {
            apply_update(
                &mut self.working.resources,
                "planet_resources",
                row,
                (row.planet, row.resource),
                now,
            )?;
        }
        Ok(())
    }

    async fn persist_production_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceProduction>],
    ) -> Result<(), GameError> {
        apply_upserts(
            &mut self.working.productions,
            "planet_resource_productions",
            rows,
            |row| (row.planet, row.resource, row.building),
            self.timestamp,
        )
    }

    async fn persist_storage_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceStorage>],
    ) -> Result<(), GameError> {
        apply_upserts(
            &mut self.working.storages,
            "planet_resource_storages",
            rows,
            |row| (row.planet, row.resource),
            self.timestamp,
        )
    }

    async fn persist_building_levels(
        &mut self,
        rows: &[Upsert<PlanetBuilding>],
    ) -> Result<(), GameError> {
        apply_upserts(
            &mut self.working.buildings,
            "planet_buildings",
            rows,
            |row| (row.planet, row.building),
            self.timestamp,
        )
    }

    async fn insert_action(&mut self, pending: &PendingAction) -> Result<(), GameError> {
        let action = &pending.action;
        if !self.working.planets.contains_key(&action.planet) {
            return Err(GameError::no_such_planet(action.planet));
        }
        let taken = self.working.actions.values().any(|existing| {
            existing.action.planet == action.planet && existing.action.building == action.building
        });
        if taken {
            return Err(GameError::duplicate_action(action.building));
        }
        self.working.actions.insert(action.id, pending.clone());
        Ok(())
    }

    async fn find_action(&mut self, action: Uuid) -> Result<Option<PendingAction>, GameError> {
        Ok(self.working.actions.get(&action).cloned())
    }

    async fn delete_action_and_snapshots(&mut self, action: Uuid) -> Result<(), GameError> {
        self.working
            .actions
            .remove(&action)
            .map(|_| ())
            .ok_or_else(GameError::no_matching_rows)
    }

    async fn commit(&mut self) -> Result<(), GameError> {
        *self.guard = self.working.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), GameError> {
        self.working = self.guard.clone();
        Ok(())
    }
}
