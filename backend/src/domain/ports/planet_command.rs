//! Driving ports for planets.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::{FullPlanet, Planet};

/// Payload for colonising a new planet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlanetRequest {
    pub player: Uuid,
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanetCommand: Send + Sync {
    async fn create_planet(&self, request: CreatePlanetRequest) -> Result<Planet, Error>;

    async fn delete_planet(&self, id: Uuid) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanetQuery: Send + Sync {
    async fn list_planets(&self, player: Option<Uuid>) -> Result<Vec<Planet>, Error>;

    /// Planet with its stockpiles, productions, storages, buildings and
    /// pending actions as currently stored.
    async fn find_planet(&self, id: Uuid) -> Result<FullPlanet, Error>;
}
