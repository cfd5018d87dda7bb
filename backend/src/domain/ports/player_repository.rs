//! Port abstraction for player persistence.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::game::{Planet, PlanetRows, Player};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by player repository adapters.
    pub enum PlayerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "player repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "player repository query failed: {message}",
        /// The referenced universe does not exist.
        NoSuchUniverse { universe: Uuid } => "no such universe {universe}",
        /// The universe already has a player with this name.
        NameTaken { name: String } => "player name already used: {name}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Insert a player with its homeworld and the homeworld's initial rows,
    /// atomically.
    async fn create(
        &self,
        player: &Player,
        homeworld: &Planet,
        rows: &PlanetRows,
    ) -> Result<(), PlayerRepositoryError>;

    /// List players, optionally restricted to one API user.
    async fn list(&self, api_user: Option<Uuid>) -> Result<Vec<Player>, PlayerRepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Player>, PlayerRepositoryError>;

    /// Delete a player and its planets. Returns `false` when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<bool, PlayerRepositoryError>;
}
