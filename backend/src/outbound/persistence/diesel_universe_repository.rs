//! PostgreSQL-backed `UniverseRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::game::{Catalogue, FullUniverse, Resource, Universe};
use crate::domain::ports::{UniverseRepository, UniverseRepositoryError};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_game_rows::{insert_catalogue, load_catalogue};
use super::models::{ResourceRow, UniverseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{resources, universes};

/// Diesel-backed implementation of the `UniverseRepository` port.
#[derive(Clone)]
pub struct DieselUniverseRepository {
    pool: DbPool,
}

impl DieselUniverseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UniverseRepositoryError {
    map_basic_pool_error(error, UniverseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UniverseRepositoryError {
    map_basic_diesel_error(
        error,
        UniverseRepositoryError::query,
        UniverseRepositoryError::connection,
    )
}

#[async_trait]
impl UniverseRepository for DieselUniverseRepository {
    async fn create(
        &self,
        universe: &Universe,
        catalogue: &Catalogue,
    ) -> Result<(), UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UniverseRow::from(universe);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(universes::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                insert_catalogue(conn, catalogue).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                UniverseRepositoryError::name_taken(universe.name.clone())
            } else {
                map_diesel_error(error)
            }
        })
    }

    async fn list(&self) -> Result<Vec<Universe>, UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UniverseRow> = universes::table
            .order(universes::name.asc())
            .select(UniverseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<FullUniverse>, UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let Some(row) = universes::table
                    .find(id)
                    .select(UniverseRow::as_select())
                    .first(conn)
                    .await
                    .optional()?
                else {
                    return Ok(None);
                };
                let catalogue = load_catalogue(conn, id).await?;
                Ok(Some(FullUniverse {
                    universe: row.into(),
                    catalogue,
                }))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(universes::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ResourceRow> = resources::table
            .order((resources::name.asc(), resources::id.asc()))
            .select(ResourceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_resource(&self, id: Uuid) -> Result<Option<Resource>, UniverseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ResourceRow> = resources::table
            .find(id)
            .select(ResourceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }
}
