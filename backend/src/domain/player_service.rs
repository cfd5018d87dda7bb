//! Player use-cases. A new player always gets a homeworld.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::{Planet, PlanetRows, Player};
use crate::domain::ports::{
    CreatePlayerRequest, PlayerCommand, PlayerQuery, PlayerRepository, PlayerRepositoryError,
    UniverseRepository,
};
use crate::domain::universe_service::{map_universe_error, required_name};

/// Name given to the planet created with a player.
pub const HOMEWORLD_NAME: &str = "Homeworld";

/// Service implementing the player driving ports.
#[derive(Clone)]
pub struct PlayerService<P, U> {
    players: Arc<P>,
    universes: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> PlayerService<P, U> {
    pub fn new(players: Arc<P>, universes: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            players,
            universes,
            clock,
        }
    }
}

pub(crate) fn map_player_error(error: PlayerRepositoryError) -> Error {
    match error {
        PlayerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("player repository unavailable: {message}"))
        }
        PlayerRepositoryError::Query { message } => {
            Error::internal(format!("player repository error: {message}"))
        }
        PlayerRepositoryError::NoSuchUniverse { .. } => Error::not_found("No such universe"),
        PlayerRepositoryError::NameTaken { .. } => Error::conflict("Name already used"),
    }
}

#[async_trait]
impl<P, U> PlayerCommand for PlayerService<P, U>
where
    P: PlayerRepository,
    U: UniverseRepository,
{
    async fn create_player(&self, request: CreatePlayerRequest) -> Result<Player, Error> {
        let name = required_name(&request.name)?;
        let universe = self
            .universes
            .find(request.universe)
            .await
            .map_err(map_universe_error)?
            .ok_or_else(|| Error::not_found("No such universe"))?;

        let now = self.clock.utc();
        let player = Player {
            id: Uuid::new_v4(),
            api_user: request.api_user,
            universe: universe.universe.id,
            name,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let homeworld = Planet {
            id: Uuid::new_v4(),
            player: player.id,
            name: HOMEWORLD_NAME.to_owned(),
            homeworld: true,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let rows = PlanetRows::initial(homeworld.id, &universe.catalogue, now);
        self.players
            .create(&player, &homeworld, &rows)
            .await
            .map_err(map_player_error)?;
        info!(player = %player.id, universe = %player.universe, homeworld = %homeworld.id, "player created");
        Ok(player)
    }

    async fn delete_player(&self, id: Uuid) -> Result<(), Error> {
        if self.players.delete(id).await.map_err(map_player_error)? {
            Ok(())
        } else {
            Err(Error::not_found("No such player"))
        }
    }
}

#[async_trait]
impl<P, U> PlayerQuery for PlayerService<P, U>
where
    P: PlayerRepository,
    U: UniverseRepository,
{
    async fn list_players(&self, api_user: Option<Uuid>) -> Result<Vec<Player>, Error> {
        self.players.list(api_user).await.map_err(map_player_error)
    }

    async fn find_player(&self, id: Uuid) -> Result<Player, Error> {
        self.players
            .find(id)
            .await
            .map_err(map_player_error)?
            .ok_or_else(|| Error::not_found("No such player"))
    }
}
