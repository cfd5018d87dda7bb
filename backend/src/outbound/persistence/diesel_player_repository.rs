//! PostgreSQL-backed `PlayerRepository`.
//!
//! A player is created together with its homeworld and the homeworld's
//! starting rows in one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::game::{Planet, PlanetRows, Player};
use crate::domain::ports::{PlayerRepository, PlayerRepositoryError};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_game_rows::insert_planet;
use super::models::PlayerRow;
use super::pool::{DbPool, PoolError};
use super::schema::players;

/// Diesel-backed implementation of the `PlayerRepository` port.
#[derive(Clone)]
pub struct DieselPlayerRepository {
    pool: DbPool,
}

impl DieselPlayerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlayerRepositoryError {
    map_basic_pool_error(error, PlayerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlayerRepositoryError {
    map_basic_diesel_error(
        error,
        PlayerRepositoryError::query,
        PlayerRepositoryError::connection,
    )
}

#[async_trait]
impl PlayerRepository for DieselPlayerRepository {
    async fn create(
        &self,
        player: &Player,
        homeworld: &Planet,
        rows: &PlanetRows,
    ) -> Result<(), PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PlayerRow::from(player);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(players::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                insert_planet(conn, homeworld, rows).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                PlayerRepositoryError::name_taken(player.name.clone())
            } else if is_foreign_key_violation(&error) {
                PlayerRepositoryError::no_such_universe(player.universe)
            } else {
                map_diesel_error(error)
            }
        })
    }

    async fn list(&self, api_user: Option<Uuid>) -> Result<Vec<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = players::table
            .select(PlayerRow::as_select())
            .order((players::name.asc(), players::id.asc()))
            .into_boxed();
        if let Some(api_user) = api_user {
            query = query.filter(players::api_user.eq(api_user));
        }
        let rows: Vec<PlayerRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlayerRow> = players::table
            .find(id)
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(players::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
