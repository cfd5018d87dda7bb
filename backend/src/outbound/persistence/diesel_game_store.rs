//! PostgreSQL-backed `GameStore`.
//!
//! Each [`GameTransaction`] owns one pooled connection with an open
//! transaction. The timestamp is the database's `now()` read right after
//! `BEGIN`, so every process agrees on the simulation clock. A transaction
//! dropped without commit leaves its connection in a transaction; the pool
//! treats such a connection as broken and discards it, which aborts the
//! transaction server side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::warn;
use uuid::Uuid;

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_game_rows::{insert_action_snapshots, load_catalogue, load_pending_actions};
use super::models::{
    BuildingActionRow, NowRow, PlanetBuildingRow, PlanetProductionRow, PlanetResourceRow,
    PlanetRow, PlanetStorageRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    buildings_actions, planets, planets_buildings, planets_resources,
    planets_resources_productions, planets_resources_storages, players,
};
use crate::domain::game::{
    GameError, PendingAction, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, PlanetSnapshot, Upsert,
};
use crate::domain::ports::{GameStore, GameTransaction};

fn map_pool_error(error: PoolError) -> GameError {
    map_basic_pool_error(error, GameError::connection)
}

fn map_diesel_error(error: DieselError) -> GameError {
    map_basic_diesel_error(error, GameError::query, GameError::connection)
}

/// Map a failed insert: a unique violation is a lost race on `table`.
fn map_insert_error(error: DieselError, table: &str) -> GameError {
    if is_unique_violation(&error) {
        GameError::optimistic_lock(table)
    } else {
        map_diesel_error(error)
    }
}

fn expect_one_row(affected: usize, table: &str) -> Result<(), GameError> {
    if affected == 0 {
        Err(GameError::optimistic_lock(table))
    } else {
        Ok(())
    }
}

/// Diesel-backed implementation of the game store port.
#[derive(Clone)]
pub struct DieselGameStore {
    pool: DbPool,
}

impl DieselGameStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for DieselGameStore {
    async fn begin(&self) -> Result<Box<dyn GameTransaction>, GameError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        let now = diesel::sql_query("SELECT now() AS now")
            .get_result::<NowRow>(&mut *conn)
            .await;
        match now {
            Ok(row) => Ok(Box::new(DieselTransaction {
                conn,
                timestamp: row.now,
                open: true,
            })),
            Err(error) => {
                if let Err(rollback) = AnsiTransactionManager::rollback_transaction(&mut *conn).await
                {
                    warn!(%rollback, "rollback after failed clock read failed");
                }
                Err(map_diesel_error(error))
            }
        }
    }

    async fn ping(&self) -> Result<(), GameError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

/// One open database transaction.
pub struct DieselTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    timestamp: DateTime<Utc>,
    open: bool,
}

impl DieselTransaction {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }

    async fn update_production(&mut self, row: &PlanetResourceProduction) -> Result<(), GameError> {
        use planets_resources_productions::dsl;

        let now = self.timestamp;
        let affected = diesel::update(
            dsl::planets_resources_productions
                .filter(dsl::planet.eq(row.planet))
                .filter(dsl::resource.eq(row.resource))
                .filter(dsl::building.is_not_distinct_from(row.building))
                .filter(dsl::version.eq(row.version)),
        )
        .set((
            dsl::production.eq(row.production),
            dsl::updated_at.eq(now),
            dsl::version.eq(dsl::version + 1),
        ))
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        expect_one_row(affected, "planets_resources_productions")
    }

    async fn update_storage(&mut self, row: &PlanetResourceStorage) -> Result<(), GameError> {
        use planets_resources_storages::dsl;

        let now = self.timestamp;
        let affected = diesel::update(
            dsl::planets_resources_storages
                .filter(dsl::planet.eq(row.planet))
                .filter(dsl::resource.eq(row.resource))
                .filter(dsl::version.eq(row.version)),
        )
        .set((
            dsl::storage.eq(row.storage),
            dsl::updated_at.eq(now),
            dsl::version.eq(dsl::version + 1),
        ))
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        expect_one_row(affected, "planets_resources_storages")
    }

    async fn update_building(&mut self, row: &PlanetBuilding) -> Result<(), GameError> {
        use planets_buildings::dsl;

        let now = self.timestamp;
        let affected = diesel::update(
            dsl::planets_buildings
                .filter(dsl::planet.eq(row.planet))
                .filter(dsl::building.eq(row.building))
                .filter(dsl::version.eq(row.version)),
        )
        .set((
            dsl::level.eq(row.level),
            dsl::updated_at.eq(now),
            dsl::version.eq(dsl::version + 1),
        ))
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        expect_one_row(affected, "planets_buildings")
    }
}

#[async_trait]
impl GameTransaction for DieselTransaction {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    async fn lock_planet(&mut self, planet: Uuid) -> Result<(), GameError> {
        planets::table
            .find(planet)
            .select(planets::id)
            .for_update()
            .first::<Uuid>(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|_| ())
            .ok_or_else(|| GameError::no_such_planet(planet))
    }

    async fn load_planet_snapshot(&mut self, planet: Uuid) -> Result<PlanetSnapshot, GameError> {
        let conn = self.conn();
        let planet_row: PlanetRow = planets::table
            .find(planet)
            .select(PlanetRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| GameError::no_such_planet(planet))?;
        let universe: Uuid = players::table
            .find(planet_row.player)
            .select(players::universe)
            .first(conn)
            .await
            .map_err(map_diesel_error)?;

        let resources: Vec<PlanetResourceRow> = planets_resources::table
            .filter(planets_resources::planet.eq(planet))
            .order(planets_resources::resource.asc())
            .select(PlanetResourceRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let productions: Vec<PlanetProductionRow> = planets_resources_productions::table
            .filter(planets_resources_productions::planet.eq(planet))
            .order((
                planets_resources_productions::resource.asc(),
                planets_resources_productions::building.asc(),
            ))
            .select(PlanetProductionRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let storages: Vec<PlanetStorageRow> = planets_resources_storages::table
            .filter(planets_resources_storages::planet.eq(planet))
            .order(planets_resources_storages::resource.asc())
            .select(PlanetStorageRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let buildings: Vec<PlanetBuildingRow> = planets_buildings::table
            .filter(planets_buildings::planet.eq(planet))
            .order(planets_buildings::building.asc())
            .select(PlanetBuildingRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let action_rows: Vec<BuildingActionRow> = buildings_actions::table
            .filter(buildings_actions::planet.eq(planet))
            .order((
                buildings_actions::completed_at.asc(),
                buildings_actions::id.asc(),
            ))
            .select(BuildingActionRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let actions = load_pending_actions(conn, action_rows)
            .await
            .map_err(map_diesel_error)?;
        let catalogue = load_catalogue(conn, universe)
            .await
            .map_err(map_diesel_error)?;

        Ok(PlanetSnapshot {
            planet: planet_row.into(),
            universe,
            resources: resources.into_iter().map(Into::into).collect(),
            productions: productions.into_iter().map(Into::into).collect(),
            storages: storages.into_iter().map(Into::into).collect(),
            buildings: buildings.into_iter().map(Into::into).collect(),
            actions,
            catalogue,
        })
    }

    async fn persist_resource_updates(
        &mut self,
        rows: &[PlanetResource],
    ) -> Result<(), GameError> {
        use planets_resources::dsl;

        for row in rows {
            let affected = diesel::update(
                dsl::planets_resources
                    .filter(dsl::planet.eq(row.planet))
                    .filter(dsl::resource.eq(row.resource))
                    .filter(dsl::version.eq(row.version)),
            )
            .set((
                dsl::amount.eq(row.amount),
                dsl::updated_at.eq(row.updated_at),
                dsl::version.eq(dsl::version + 1),
            ))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
            expect_one_row(affected, "planets_resources")?;
        }
        Ok(())
    }

    async fn persist_production_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceProduction>],
    ) -> Result<(), GameError> {
        for upsert in rows {
            match upsert {
                Upsert::Insert(row) => {
                    diesel::insert_into(planets_resources_productions::table)
                        .values(PlanetProductionRow::new_for(row))
                        .execute(self.conn())
                        .await
                        .map_err(|error| map_insert_error(error, "planets_resources_productions"))?;
                }
                Upsert::Update(row) => self.update_production(row).await?,
            }
        }
        Ok(())
    }

    async fn persist_storage_updates(
        &mut self,
        rows: &[Upsert<PlanetResourceStorage>],
    ) -> Result<(), GameError> {
        for upsert in rows {
            match upsert {
                Upsert::Insert(row) => {
                    diesel::insert_into(planets_resources_storages::table)
                        .values(PlanetStorageRow::from(row))
                        .execute(self.conn())
                        .await
                        .map_err(|error| map_insert_error(error, "planets_resources_storages"))?;
                }
                Upsert::Update(row) => self.update_storage(row).await?,
            }
        }
        Ok(())
    }

    async fn persist_building_levels(
        &mut self,
        rows: &[Upsert<PlanetBuilding>],
    ) -> Result<(), GameError> {
        for upsert in rows {
            match upsert {
                Upsert::Insert(row) => {
                    diesel::insert_into(planets_buildings::table)
                        .values(PlanetBuildingRow::from(row))
                        .execute(self.conn())
                        .await
                        .map_err(|error| map_insert_error(error, "planets_buildings"))?;
                }
                Upsert::Update(row) => self.update_building(row).await?,
            }
        }
        Ok(())
    }

    async fn insert_action(&mut self, pending: &PendingAction) -> Result<(), GameError> {
        let action = &pending.action;
        diesel::insert_into(buildings_actions::table)
            .values(BuildingActionRow::from(action))
            .execute(self.conn())
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    GameError::duplicate_action(action.building)
                } else if is_foreign_key_violation(&error) {
                    GameError::no_such_planet(action.planet)
                } else {
                    map_diesel_error(error)
                }
            })?;
        insert_action_snapshots(self.conn(), pending)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_action(&mut self, action: Uuid) -> Result<Option<PendingAction>, GameError> {
        let conn = self.conn();
        let Some(row) = buildings_actions::table
            .find(action)
            .select(BuildingActionRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let mut loaded = load_pending_actions(conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        Ok(loaded.pop())
    }

    async fn delete_action_and_snapshots(&mut self, action: Uuid) -> Result<(), GameError> {
        // Snapshot rows go with the action through ON DELETE CASCADE.
        let affected = diesel::delete(buildings_actions::table.find(action))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(GameError::no_matching_rows());
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), GameError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        AnsiTransactionManager::commit_transaction(self.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), GameError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        AnsiTransactionManager::rollback_transaction(self.conn())
            .await
            .map_err(map_diesel_error)
    }
}
