//! Building actions: derivation from the catalogue, validation and the cost
//! bookkeeping done when an action is created or cancelled.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::GameError;
use super::planet::{PlanetResource, PlanetSnapshot};
use crate::domain::progression::{completion_time, cost_at, production_at, storage_at};

/// An in-flight upgrade of one building on one planet.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingAction {
    pub id: Uuid,
    pub planet: Uuid,
    pub building: Uuid,
    pub current_level: i32,
    pub desired_level: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Amount of a resource paid when the action was created.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingActionCost {
    pub action: Uuid,
    pub resource: Uuid,
    pub amount: i32,
}

/// Production the building grants once the action completes.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingActionResourceProduction {
    pub action: Uuid,
    pub resource: Uuid,
    pub production: i32,
}

/// Storage cap the building grants once the action completes.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingActionResourceStorage {
    pub action: Uuid,
    pub resource: Uuid,
    pub storage: i32,
}

/// An action together with the values captured when it was created.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: BuildingAction,
    pub costs: Vec<BuildingActionCost>,
    pub productions: Vec<BuildingActionResourceProduction>,
    pub storages: Vec<BuildingActionResourceStorage>,
}

/// Derive the next upgrade of `building` on the snapshot's planet.
///
/// Costs, productions and storages are evaluated at the desired level, which
/// is one above the current level (0 for a building never built).
///
/// # Errors
///
/// [`GameError::NoSuchBuilding`] when the building is not in the planet's
/// catalogue, [`GameError::NoSuchResource`] when the completion time cannot
/// be computed.
pub fn derive_action(
    snapshot: &PlanetSnapshot,
    building: Uuid,
    created_at: DateTime<Utc>,
) -> Result<PendingAction, GameError> {
    let catalogue = &snapshot.catalogue;
    if catalogue.building(building).is_none() {
        return Err(GameError::no_such_building(building));
    }

    let id = Uuid::new_v4();
    let current_level = snapshot.building_level(building);
    let desired_level = current_level + 1;

    let costs: Vec<BuildingActionCost> = catalogue
        .costs_for(building)
        .map(|row| BuildingActionCost {
            action: id,
            resource: row.resource,
            amount: cost_at(row.cost, row.progress, desired_level),
        })
        .collect();
    let productions = catalogue
        .productions_for(building)
        .map(|row| BuildingActionResourceProduction {
            action: id,
            resource: row.resource,
            production: production_at(row.base, row.progress, desired_level),
        })
        .collect();
    let storages = catalogue
        .storages_for(building)
        .map(|row| BuildingActionResourceStorage {
            action: id,
            resource: row.resource,
            storage: storage_at(row.base, row.progress, desired_level),
        })
        .collect();

    let completed_at = created_at + completion_time(catalogue, &costs)?;

    Ok(PendingAction {
        action: BuildingAction {
            id,
            planet: snapshot.planet.id,
            building,
            current_level,
            desired_level,
            created_at,
            completed_at,
        },
        costs,
        productions,
        storages,
    })
}

/// Check that the planet may start `pending`.
///
/// # Errors
///
/// - [`GameError::NoSuchBuilding`] for a building outside the catalogue.
/// - [`GameError::DuplicateAction`] when the building is already upgrading.
/// - [`GameError::NotEnoughResources`] when a stockpile cannot pay its cost.
pub fn validate_action(snapshot: &PlanetSnapshot, pending: &PendingAction) -> Result<(), GameError> {
    let building = pending.action.building;
    if snapshot.catalogue.building(building).is_none() {
        return Err(GameError::no_such_building(building));
    }
    if snapshot.action_for(building).is_some() {
        return Err(GameError::duplicate_action(building));
    }

    for cost in &pending.costs {
        let available = snapshot.resource(cost.resource).map_or(0.0, |row| row.amount);
        if available < f64::from(cost.amount) {
            return Err(GameError::not_enough_resources(cost.resource));
        }
    }
    Ok(())
}

fn apply_costs(
    snapshot: &mut PlanetSnapshot,
    pending: &PendingAction,
    sign: f64,
) -> Result<Vec<PlanetResource>, GameError> {
    let mut changed = Vec::with_capacity(pending.costs.len());
    for cost in &pending.costs {
        let row = snapshot
            .resource_mut(cost.resource)
            .ok_or_else(|| GameError::no_such_resource(cost.resource.to_string()))?;
        row.amount += sign * f64::from(cost.amount);
        changed.push(row.clone());
    }
    Ok(changed)
}

/// Subtract the action's costs from the snapshot stockpiles and return the
/// rows to persist.
///
/// # Errors
///
/// [`GameError::NoSuchResource`] when the planet lacks a costed resource.
pub fn debit_costs(
    snapshot: &mut PlanetSnapshot,
    pending: &PendingAction,
) -> Result<Vec<PlanetResource>, GameError> {
    apply_costs(snapshot, pending, -1.0)
}

/// Give the action's costs back to the snapshot stockpiles and return the
/// rows to persist.
///
/// # Errors
///
/// [`GameError::NoSuchResource`] when the planet lacks a costed resource.
pub fn credit_costs(
    snapshot: &mut PlanetSnapshot,
    pending: &PendingAction,
) -> Result<Vec<PlanetResource>, GameError> {
    apply_costs(snapshot, pending, 1.0)
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
