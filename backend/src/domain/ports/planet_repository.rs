//! Port abstraction for planet persistence outside the simulation core.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::game::{Planet, PlanetRows};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by planet repository adapters.
    pub enum PlanetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "planet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "planet repository query failed: {message}",
        /// The owning player does not exist.
        NoSuchPlayer { player: Uuid } => "no such player {player}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanetRepository: Send + Sync {
    /// Insert a planet with its initial rows, atomically.
    async fn create(&self, planet: &Planet, rows: &PlanetRows) -> Result<(), PlanetRepositoryError>;

    /// List planets, optionally restricted to one player.
    async fn list(&self, player: Option<Uuid>) -> Result<Vec<Planet>, PlanetRepositoryError>;

    /// Delete a planet with its rows and actions. Returns `false` when
    /// nothing matched.
    async fn delete(&self, id: Uuid) -> Result<bool, PlanetRepositoryError>;
}
