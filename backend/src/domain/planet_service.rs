//! Planet use-cases outside the simulation core.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::{FullPlanet, Planet, PlanetRows};
use crate::domain::player_service::map_player_error;
use crate::domain::ports::{
    CreatePlanetRequest, GameStore, PlanetCommand, PlanetQuery, PlanetRepository,
    PlanetRepositoryError, PlayerRepository, UniverseRepository,
};
use crate::domain::transaction::finish;
use crate::domain::universe_service::{map_universe_error, required_name};

fn map_planet_error(error: PlanetRepositoryError) -> Error {
    match error {
        PlanetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("planet repository unavailable: {message}"))
        }
        PlanetRepositoryError::Query { message } => {
            Error::internal(format!("planet repository error: {message}"))
        }
        PlanetRepositoryError::NoSuchPlayer { .. } => Error::not_found("No such player"),
    }
}

/// Service implementing [`PlanetCommand`].
#[derive(Clone)]
pub struct PlanetCommandService<P, Q, U> {
    planets: Arc<P>,
    players: Arc<Q>,
    universes: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, Q, U> PlanetCommandService<P, Q, U> {
    pub fn new(planets: Arc<P>, players: Arc<Q>, universes: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            planets,
            players,
            universes,
            clock,
        }
    }
}

#[async_trait]
impl<P, Q, U> PlanetCommand for PlanetCommandService<P, Q, U>
where
    P: PlanetRepository,
    Q: PlayerRepository,
    U: UniverseRepository,
{
    async fn create_planet(&self, request: CreatePlanetRequest) -> Result<Planet, Error> {
        let name = required_name(&request.name)?;
        let player = self
            .players
            .find(request.player)
            .await
            .map_err(map_player_error)?
            .ok_or_else(|| Error::not_found("No such player"))?;
        let universe = self
            .universes
            .find(player.universe)
            .await
            .map_err(map_universe_error)?
            .ok_or_else(|| Error::not_found("No such universe"))?;

        let now = self.clock.utc();
        let planet = Planet {
            id: Uuid::new_v4(),
            player: player.id,
            name,
            homeworld: false,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let rows = PlanetRows::initial(planet.id, &universe.catalogue, now);
        self.planets
            .create(&planet, &rows)
            .await
            .map_err(map_planet_error)?;
        info!(planet = %planet.id, player = %player.id, "planet created");
        Ok(planet)
    }

    async fn delete_planet(&self, id: Uuid) -> Result<(), Error> {
        if self.planets.delete(id).await.map_err(map_planet_error)? {
            Ok(())
        } else {
            Err(Error::not_found("No such planet"))
        }
    }
}

/// Service implementing [`PlanetQuery`].
#[derive(Clone)]
pub struct PlanetQueryService<S, P> {
    store: Arc<S>,
    planets: Arc<P>,
}

impl<S, P> PlanetQueryService<S, P> {
    pub fn new(store: Arc<S>, planets: Arc<P>) -> Self {
        Self { store, planets }
    }
}

#[async_trait]
impl<S, P> PlanetQuery for PlanetQueryService<S, P>
where
    S: GameStore,
    P: PlanetRepository,
{
    async fn list_planets(&self, player: Option<Uuid>) -> Result<Vec<Planet>, Error> {
        self.planets.list(player).await.map_err(map_planet_error)
    }

    async fn find_planet(&self, id: Uuid) -> Result<FullPlanet, Error> {
        let mut tx = self.store.begin().await.map_err(Error::from)?;
        let loaded = tx.load_planet_snapshot(id).await;
        let snapshot = finish(tx.as_mut(), loaded)
            .await
            .map_err(Error::from)?;
        Ok(FullPlanet::from(snapshot))
    }
}
