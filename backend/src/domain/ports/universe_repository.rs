//! Port abstraction for universe and catalogue persistence.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::game::{Catalogue, FullUniverse, Resource, Universe};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by universe repository adapters.
    pub enum UniverseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "universe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "universe repository query failed: {message}",
        /// Another universe already uses the name.
        NameTaken { name: String } => "universe name already used: {name}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseRepository: Send + Sync {
    /// Insert a universe together with its catalogue in one transaction.
    async fn create(
        &self,
        universe: &Universe,
        catalogue: &Catalogue,
    ) -> Result<(), UniverseRepositoryError>;

    async fn list(&self) -> Result<Vec<Universe>, UniverseRepositoryError>;

    /// Fetch a universe with its catalogue.
    async fn find(&self, id: Uuid) -> Result<Option<FullUniverse>, UniverseRepositoryError>;

    /// Delete a universe and everything in it. Returns `false` when nothing
    /// matched.
    async fn delete(&self, id: Uuid) -> Result<bool, UniverseRepositoryError>;

    /// Resources of every universe.
    async fn list_resources(&self) -> Result<Vec<Resource>, UniverseRepositoryError>;

    async fn find_resource(&self, id: Uuid) -> Result<Option<Resource>, UniverseRepositoryError>;
}
