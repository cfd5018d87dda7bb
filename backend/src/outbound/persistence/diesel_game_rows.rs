//! Multi-table reads and writes shared by the game store and repositories.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{
    ActionCostRow, ActionProductionRow, ActionStorageRow, BuildingActionRow, BuildingCostRow,
    BuildingProductionRow, BuildingRow, BuildingStorageRow, PlanetBuildingRow, PlanetProductionRow,
    PlanetResourceRow, PlanetRow, PlanetStorageRow, ResourceRow,
};
use super::schema::{
    building_costs, building_resources_productions, building_resources_storages, buildings,
    buildings_actions_costs, buildings_actions_resources_productions,
    buildings_actions_resources_storages, planets, planets_buildings, planets_resources,
    planets_resources_productions, planets_resources_storages, resources,
};
use crate::domain::game::{Catalogue, PendingAction, Planet, PlanetRows};

/// Load the catalogue of `universe`, ordered by name.
pub(crate) async fn load_catalogue(
    conn: &mut AsyncPgConnection,
    universe: Uuid,
) -> QueryResult<Catalogue> {
    let resource_rows: Vec<ResourceRow> = resources::table
        .filter(resources::universe.eq(universe))
        .order(resources::name.asc())
        .select(ResourceRow::as_select())
        .load(conn)
        .await?;
    let building_rows: Vec<BuildingRow> = buildings::table
        .filter(buildings::universe.eq(universe))
        .order(buildings::name.asc())
        .select(BuildingRow::as_select())
        .load(conn)
        .await?;
    let ids: Vec<Uuid> = building_rows.iter().map(|row| row.id).collect();

    let costs: Vec<BuildingCostRow> = building_costs::table
        .filter(building_costs::building.eq_any(&ids))
        .select(BuildingCostRow::as_select())
        .load(conn)
        .await?;
    let productions: Vec<BuildingProductionRow> = building_resources_productions::table
        .filter(building_resources_productions::building.eq_any(&ids))
        .select(BuildingProductionRow::as_select())
        .load(conn)
        .await?;
    let storages: Vec<BuildingStorageRow> = building_resources_storages::table
        .filter(building_resources_storages::building.eq_any(&ids))
        .select(BuildingStorageRow::as_select())
        .load(conn)
        .await?;

    Ok(Catalogue {
        resources: resource_rows.into_iter().map(Into::into).collect(),
        buildings: building_rows.into_iter().map(Into::into).collect(),
        costs: costs.into_iter().map(Into::into).collect(),
        productions: productions.into_iter().map(Into::into).collect(),
        storages: storages.into_iter().map(Into::into).collect(),
    })
}

pub(crate) async fn insert_catalogue(
    conn: &mut AsyncPgConnection,
    catalogue: &Catalogue,
) -> QueryResult<()> {
    let resource_rows: Vec<ResourceRow> = catalogue.resources.iter().map(Into::into).collect();
    let building_rows: Vec<BuildingRow> = catalogue.buildings.iter().map(Into::into).collect();
    let cost_rows: Vec<BuildingCostRow> = catalogue.costs.iter().map(Into::into).collect();
    let production_rows: Vec<BuildingProductionRow> =
        catalogue.productions.iter().map(Into::into).collect();
    let storage_rows: Vec<BuildingStorageRow> =
        catalogue.storages.iter().map(Into::into).collect();

    if !resource_rows.is_empty() {
        diesel::insert_into(resources::table)
            .values(&resource_rows)
            .execute(conn)
            .await?;
    }
    if !building_rows.is_empty() {
        diesel::insert_into(buildings::table)
            .values(&building_rows)
            .execute(conn)
            .await?;
    }
    if !cost_rows.is_empty() {
        diesel::insert_into(building_costs::table)
            .values(&cost_rows)
            .execute(conn)
            .await?;
    }
    if !production_rows.is_empty() {
        diesel::insert_into(building_resources_productions::table)
            .values(&production_rows)
            .execute(conn)
            .await?;
    }
    if !storage_rows.is_empty() {
        diesel::insert_into(building_resources_storages::table)
            .values(&storage_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Insert a planet and its starting rows.
pub(crate) async fn insert_planet(
    conn: &mut AsyncPgConnection,
    planet: &Planet,
    rows: &PlanetRows,
) -> QueryResult<()> {
    diesel::insert_into(planets::table)
        .values(PlanetRow::from(planet))
        .execute(conn)
        .await?;

    let resource_rows: Vec<PlanetResourceRow> = rows.resources.iter().map(Into::into).collect();
    let production_rows: Vec<PlanetProductionRow> = rows
        .productions
        .iter()
        .map(PlanetProductionRow::new_for)
        .collect();
    let storage_rows: Vec<PlanetStorageRow> = rows.storages.iter().map(Into::into).collect();
    let building_rows: Vec<PlanetBuildingRow> = rows.buildings.iter().map(Into::into).collect();

    if !resource_rows.is_empty() {
        diesel::insert_into(planets_resources::table)
            .values(&resource_rows)
            .execute(conn)
            .await?;
    }
    if !production_rows.is_empty() {
        diesel::insert_into(planets_resources_productions::table)
            .values(&production_rows)
            .execute(conn)
            .await?;
    }
    if !storage_rows.is_empty() {
        diesel::insert_into(planets_resources_storages::table)
            .values(&storage_rows)
            .execute(conn)
            .await?;
    }
    if !building_rows.is_empty() {
        diesel::insert_into(planets_buildings::table)
            .values(&building_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Attach the snapshot rows to each action, keeping the input order.
pub(crate) async fn load_pending_actions(
    conn: &mut AsyncPgConnection,
    actions: Vec<BuildingActionRow>,
) -> QueryResult<Vec<PendingAction>> {
    if actions.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = actions.iter().map(|row| row.id).collect();

    let costs: Vec<ActionCostRow> = buildings_actions_costs::table
        .filter(buildings_actions_costs::action.eq_any(&ids))
        .select(ActionCostRow::as_select())
        .load(conn)
        .await?;
    let productions: Vec<ActionProductionRow> = buildings_actions_resources_productions::table
        .filter(buildings_actions_resources_productions::action.eq_any(&ids))
        .select(ActionProductionRow::as_select())
        .load(conn)
        .await?;
    let storages: Vec<ActionStorageRow> = buildings_actions_resources_storages::table
        .filter(buildings_actions_resources_storages::action.eq_any(&ids))
        .select(ActionStorageRow::as_select())
        .load(conn)
        .await?;

    let mut pending: Vec<PendingAction> = actions
        .into_iter()
        .map(|row| PendingAction {
            action: row.into(),
            costs: Vec::new(),
            productions: Vec::new(),
            storages: Vec::new(),
        })
        .collect();
    let index: HashMap<Uuid, usize> = pending
        .iter()
        .enumerate()
        .map(|(position, entry)| (entry.action.id, position))
        .collect();

    for row in costs {
        if let Some(&position) = index.get(&row.action) {
            pending[position].costs.push(row.into());
        }
    }
    for row in productions {
        if let Some(&position) = index.get(&row.action) {
            pending[position].productions.push(row.into());
        }
    }
    for row in storages {
        if let Some(&position) = index.get(&row.action) {
            pending[position].storages.push(row.into());
        }
    }
    Ok(pending)
}

/// Insert the snapshot rows of an action whose parent row already exists.
pub(crate) async fn insert_action_snapshots(
    conn: &mut AsyncPgConnection,
    pending: &PendingAction,
) -> QueryResult<()> {
    let costs: Vec<ActionCostRow> = pending.costs.iter().map(Into::into).collect();
    let productions: Vec<ActionProductionRow> =
        pending.productions.iter().map(Into::into).collect();
    let storages: Vec<ActionStorageRow> = pending.storages.iter().map(Into::into).collect();

    if !costs.is_empty() {
        diesel::insert_into(buildings_actions_costs::table)
            .values(&costs)
            .execute(conn)
            .await?;
    }
    if !productions.is_empty() {
        diesel::insert_into(buildings_actions_resources_productions::table)
            .values(&productions)
            .execute(conn)
            .await?;
    }
    if !storages.is_empty() {
        diesel::insert_into(buildings_actions_resources_storages::table)
            .values(&storages)
            .execute(conn)
            .await?;
    }
    Ok(())
}
