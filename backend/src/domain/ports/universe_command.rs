//! Driving ports for universes and their catalogue.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::{FullUniverse, Resource, Universe};

/// Payload for creating a universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUniverseRequest {
    pub name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseCommand: Send + Sync {
    /// Create a universe seeded with the standard catalogue.
    async fn create_universe(&self, request: CreateUniverseRequest) -> Result<FullUniverse, Error>;

    async fn delete_universe(&self, id: Uuid) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseQuery: Send + Sync {
    async fn list_universes(&self) -> Result<Vec<Universe>, Error>;

    async fn find_universe(&self, id: Uuid) -> Result<FullUniverse, Error>;

    async fn list_resources(&self) -> Result<Vec<Resource>, Error>;

    async fn find_resource(&self, id: Uuid) -> Result<Resource, Error>;
}
