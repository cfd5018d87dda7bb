//! Planet catch-up engine.
//!
//! Brings a planet to a target instant: stockpiles are integrated between
//! events, building actions whose completion time has passed are applied in
//! `(completed_at, id)` order, and the changed rows are written back through
//! the store transaction. Planning is pure and loop based; only [`advance`]
//! touches the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::game::{
    GameError, PendingAction, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, PlanetSnapshot, Upsert,
};
use super::ports::GameTransaction;
use super::progression::integrate_stockpile;

/// Rows changed by a catch-up, ready to be persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchUpPlan {
    pub target: Option<DateTime<Utc>>,
    pub resources: Vec<PlanetResource>,
    pub productions: Vec<Upsert<PlanetResourceProduction>>,
    pub storages: Vec<Upsert<PlanetResourceStorage>>,
    pub buildings: Vec<Upsert<PlanetBuilding>>,
    /// Actions applied, in application order.
    pub completed: Vec<Uuid>,
}

impl CatchUpPlan {
    /// Whether the catch-up changed nothing.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
            && self.productions.is_empty()
            && self.storages.is_empty()
            && self.buildings.is_empty()
            && self.completed.is_empty()
    }
}

/// Keys of rows written during planning; `true` marks rows that did not
/// exist in the store.
#[derive(Default)]
struct Touched {
    productions: HashMap<(Uuid, Option<Uuid>), bool>,
    storages: HashMap<Uuid, bool>,
    buildings: HashMap<Uuid, bool>,
}

fn mark<K: std::hash::Hash + Eq>(rows: &mut HashMap<K, bool>, key: K, inserted: bool) {
    let flag = rows.entry(key).or_insert(inserted);
    *flag |= inserted;
}

fn upsert<T: Clone>(row: &T, inserted: bool) -> Upsert<T> {
    if inserted {
        Upsert::Insert(row.clone())
    } else {
        Upsert::Update(row.clone())
    }
}

fn integrate_all(snapshot: &mut PlanetSnapshot, to: DateTime<Utc>) {
    let laws: Vec<(f64, f64)> = snapshot
        .resources
        .iter()
        .map(|row| {
            (
                snapshot.aggregated_production(row.resource) as f64,
                f64::from(snapshot.storage_cap(row.resource)),
            )
        })
        .collect();

    for (row, (rate, cap)) in snapshot.resources.iter_mut().zip(laws) {
        let (amount, updated_at) = integrate_stockpile(row.amount, rate, row.updated_at, to, cap);
        row.amount = amount;
        row.updated_at = updated_at;
    }
}

fn has_resource(snapshot: &PlanetSnapshot, pending: &PendingAction, resource: Uuid) -> bool {
    let present = snapshot.resource(resource).is_some();
    if !present {
        warn!(
            planet = %snapshot.planet.id,
            action = %pending.action.id,
            %resource,
            "action references a resource the planet does not have, skipping row"
        );
    }
    present
}

fn apply_building_level(snapshot: &mut PlanetSnapshot, pending: &PendingAction, touched: &mut Touched) {
    let action = &pending.action;
    let at = action.completed_at;
    if let Some(row) = snapshot
        .buildings
        .iter_mut()
        .find(|row| row.building == action.building)
    {
        row.level = action.desired_level;
        row.updated_at = at;
        mark(&mut touched.buildings, action.building, false);
    } else {
        snapshot.buildings.push(PlanetBuilding {
            planet: action.planet,
            building: action.building,
            level: action.desired_level,
            created_at: at,
            updated_at: at,
            version: 0,
        });
        mark(&mut touched.buildings, action.building, true);
    }
}

fn apply_productions(snapshot: &mut PlanetSnapshot, pending: &PendingAction, touched: &mut Touched) {
    let action = &pending.action;
    let at = action.completed_at;
    for row in &pending.productions {
        if !has_resource(snapshot, pending, row.resource) {
            continue;
        }
        let key = (row.resource, Some(action.building));
        if let Some(existing) = snapshot
            .productions
            .iter_mut()
            .find(|existing| (existing.resource, existing.building) == key)
        {
            existing.production = row.production;
            existing.updated_at = at;
            mark(&mut touched.productions, key, false);
        } else {
            snapshot.productions.push(PlanetResourceProduction {
                planet: action.planet,
                building: Some(action.building),
                resource: row.resource,
                production: row.production,
                created_at: at,
                updated_at: at,
                version: 0,
            });
            mark(&mut touched.productions, key, true);
        }
    }
}

fn apply_storages(snapshot: &mut PlanetSnapshot, pending: &PendingAction, touched: &mut Touched) {
    let action = &pending.action;
    let at = action.completed_at;
    for row in &pending.storages {
        if !has_resource(snapshot, pending, row.resource) {
            continue;
        }
        if let Some(existing) = snapshot
            .storages
            .iter_mut()
            .find(|existing| existing.resource == row.resource)
        {
            existing.storage = row.storage;
            existing.updated_at = at;
            mark(&mut touched.storages, row.resource, false);
        } else {
            snapshot.storages.push(PlanetResourceStorage {
                planet: action.planet,
                resource: row.resource,
                storage: row.storage,
                created_at: at,
                updated_at: at,
                version: 0,
            });
            mark(&mut touched.storages, row.resource, true);
        }
    }
}

/// Advance `snapshot` in memory to `target` and describe the rows to persist.
///
/// Productions add up across the base row and building rows; a storage
/// action replaces the cap of its resource.
pub fn plan_catch_up(snapshot: &mut PlanetSnapshot, target: DateTime<Utc>) -> CatchUpPlan {
    let original = snapshot.resources.clone();
    let mut touched = Touched::default();

    let (mut due, pending): (Vec<PendingAction>, Vec<PendingAction>) = snapshot
        .actions
        .drain(..)
        .partition(|pending| pending.action.completed_at <= target);
    snapshot.actions = pending;
    due.sort_by_key(|pending| (pending.action.completed_at, pending.action.id));

    let mut completed = Vec::with_capacity(due.len());
    for pending in &due {
        integrate_all(snapshot, pending.action.completed_at);
        apply_building_level(snapshot, pending, &mut touched);
        apply_productions(snapshot, pending, &mut touched);
        apply_storages(snapshot, pending, &mut touched);
        completed.push(pending.action.id);
    }
    integrate_all(snapshot, target);

    let resources = snapshot
        .resources
        .iter()
        .filter(|row| !original.contains(row))
        .cloned()
        .collect();
    let productions = snapshot
        .productions
        .iter()
        .filter_map(|row| {
            touched
                .productions
                .get(&(row.resource, row.building))
                .map(|&inserted| upsert(row, inserted))
        })
        .collect();
    let storages = snapshot
        .storages
        .iter()
        .filter_map(|row| {
            touched
                .storages
                .get(&row.resource)
                .map(|&inserted| upsert(row, inserted))
        })
        .collect();
    let buildings = snapshot
        .buildings
        .iter()
        .filter_map(|row| {
            touched
                .buildings
                .get(&row.building)
                .map(|&inserted| upsert(row, inserted))
        })
        .collect();

    CatchUpPlan {
        target: Some(target),
        resources,
        productions,
        storages,
        buildings,
        completed,
    }
}

async fn persist_plan(tx: &mut dyn GameTransaction, plan: &CatchUpPlan) -> Result<(), GameError> {
    if !plan.buildings.is_empty() {
        tx.persist_building_levels(&plan.buildings).await?;
    }
    if !plan.productions.is_empty() {
        tx.persist_production_updates(&plan.productions).await?;
    }
    if !plan.storages.is_empty() {
        tx.persist_storage_updates(&plan.storages).await?;
    }
    if !plan.resources.is_empty() {
        tx.persist_resource_updates(&plan.resources).await?;
    }
    for action in &plan.completed {
        tx.delete_action_and_snapshots(*action).await?;
    }
    Ok(())
}

/// Bring `planet` up to date inside `tx`.
///
/// The target instant is the later of `caller_time` and the transaction
/// timestamp. The planet row is locked for the rest of the transaction.
/// Calling it again with the same or an earlier time changes nothing.
///
/// # Errors
///
/// Propagates store failures; the caller rolls the transaction back.
pub async fn advance(
    tx: &mut dyn GameTransaction,
    planet: Uuid,
    caller_time: DateTime<Utc>,
) -> Result<CatchUpPlan, GameError> {
    let target = caller_time.max(tx.timestamp());
    tx.lock_planet(planet).await?;
    let mut snapshot = tx.load_planet_snapshot(planet).await?;

    let plan = plan_catch_up(&mut snapshot, target);
    if !plan.is_empty() {
        debug!(
            %planet,
            %target,
            completed = plan.completed.len(),
            resources = plan.resources.len(),
            "planet caught up"
        );
        persist_plan(tx, &plan).await?;
    }
    Ok(plan)
}

#[cfg(test)]
#[path = "catch_up_tests.rs"]
mod tests;
