//! Driving ports for players.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::Player;

/// Payload for registering a player in a universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlayerRequest {
    pub api_user: Uuid,
    pub universe: Uuid,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerCommand: Send + Sync {
    /// Register a player and give it a homeworld.
    async fn create_player(&self, request: CreatePlayerRequest) -> Result<Player, Error>;

    async fn delete_player(&self, id: Uuid) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerQuery: Send + Sync {
    async fn list_players(&self, api_user: Option<Uuid>) -> Result<Vec<Player>, Error>;

    async fn find_player(&self, id: Uuid) -> Result<Player, Error>;
}
