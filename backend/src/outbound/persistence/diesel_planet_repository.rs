//! PostgreSQL-backed `PlanetRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::game::{Planet, PlanetRows};
use crate::domain::ports::{PlanetRepository, PlanetRepositoryError};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_game_rows::insert_planet;
use super::models::PlanetRow;
use super::pool::{DbPool, PoolError};
use super::schema::planets;

/// Diesel-backed implementation of the `PlanetRepository` port.
#[derive(Clone)]
pub struct DieselPlanetRepository {
    pool: DbPool,
}

impl DieselPlanetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlanetRepositoryError {
    map_basic_pool_error(error, PlanetRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlanetRepositoryError {
    map_basic_diesel_error(
        error,
        PlanetRepositoryError::query,
        PlanetRepositoryError::connection,
    )
}

#[async_trait]
impl PlanetRepository for DieselPlanetRepository {
    async fn create(&self, planet: &Planet, rows: &PlanetRows) -> Result<(), PlanetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { insert_planet(conn, planet, rows).await }.scope_boxed())
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    PlanetRepositoryError::no_such_player(planet.player)
                } else {
                    map_diesel_error(error)
                }
            })
    }

    async fn list(&self, player: Option<Uuid>) -> Result<Vec<Planet>, PlanetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = planets::table
            .select(PlanetRow::as_select())
            .order((planets::name.asc(), planets::id.asc()))
            .into_boxed();
        if let Some(player) = player {
            query = query.filter(planets::player.eq(player));
        }
        let rows: Vec<PlanetRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PlanetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(planets::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
