//! Universe and catalogue use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::{FullUniverse, Resource, Universe, standard_catalogue};
use crate::domain::ports::{
    CreateUniverseRequest, UniverseCommand, UniverseQuery, UniverseRepository,
    UniverseRepositoryError,
};

/// Service implementing the universe driving ports.
#[derive(Clone)]
pub struct UniverseService<R> {
    universes: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UniverseService<R> {
    pub fn new(universes: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { universes, clock }
    }
}

pub(crate) fn map_universe_error(error: UniverseRepositoryError) -> Error {
    match error {
        UniverseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("universe repository unavailable: {message}"))
        }
        UniverseRepositoryError::Query { message } => {
            Error::internal(format!("universe repository error: {message}"))
        }
        UniverseRepositoryError::NameTaken { .. } => Error::conflict("Name already used"),
    }
}

/// Trimmed, non-empty name or a 400.
pub(crate) fn required_name(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request("name must not be empty"));
    }
    Ok(trimmed.to_owned())
}

#[async_trait]
impl<R> UniverseCommand for UniverseService<R>
where
    R: UniverseRepository,
{
    async fn create_universe(&self, request: CreateUniverseRequest) -> Result<FullUniverse, Error> {
        let name = required_name(&request.name)?;
        let now = self.clock.utc();
        let universe = Universe {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let catalogue = standard_catalogue(universe.id, now);
        self.universes
            .create(&universe, &catalogue)
            .await
            .map_err(map_universe_error)?;
        info!(universe = %universe.id, name = %universe.name, "universe created");
        Ok(FullUniverse {
            universe,
            catalogue,
        })
    }

    async fn delete_universe(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .universes
            .delete(id)
            .await
            .map_err(map_universe_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found("No such universe"))
        }
    }
}

#[async_trait]
impl<R> UniverseQuery for UniverseService<R>
where
    R: UniverseRepository,
{
    async fn list_universes(&self) -> Result<Vec<Universe>, Error> {
        self.universes.list().await.map_err(map_universe_error)
    }

    async fn find_universe(&self, id: Uuid) -> Result<FullUniverse, Error> {
        self.universes
            .find(id)
            .await
            .map_err(map_universe_error)?
            .ok_or_else(|| Error::not_found("No such universe"))
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        self.universes
            .list_resources()
            .await
            .map_err(map_universe_error)
    }

    async fn find_resource(&self, id: Uuid) -> Result<Resource, Error> {
        self.universes
            .find_resource(id)
            .await
            .map_err(map_universe_error)?
            .ok_or_else(|| Error::not_found("No such resource"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUniverseRepository;
    use crate::test_support::{MutableClock, epoch};
    use rstest::rstest;

    fn service(repo: MockUniverseRepository) -> UniverseService<MockUniverseRepository> {
        UniverseService::new(Arc::new(repo), Arc::new(MutableClock::new(epoch())))
    }

    #[rstest]
    #[tokio::test]
    async fn created_universes_carry_the_standard_catalogue() {
        let mut repo = MockUniverseRepository::new();
        repo.expect_create()
            .withf(|universe, catalogue| {
                universe.name == "andromeda" && catalogue.resources.len() == 3
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let created = service(repo)
            .create_universe(CreateUniverseRequest {
                name: "  andromeda ".to_owned(),
            })
            .await
            .expect("created");

        assert_eq!(created.universe.name, "andromeda");
        assert_eq!(created.universe.created_at, epoch());
        assert_eq!(created.catalogue.buildings.len(), 6);
        assert!(
            created
                .catalogue
                .resources
                .iter()
                .all(|resource| resource.universe == created.universe.id)
        );
    }

    #[rstest]
    #[case(UniverseRepositoryError::name_taken("andromeda"), ErrorCode::Conflict)]
    #[case(UniverseRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UniverseRepositoryError::query("boom"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_mapped(
        #[case] failure: UniverseRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockUniverseRepository::new();
        repo.expect_create()
            .return_once(move |_, _| Err(failure));

        let err = service(repo)
            .create_universe(CreateUniverseRequest {
                name: "andromeda".to_owned(),
            })
            .await
            .expect_err("failed");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_names_are_rejected_before_persisting() {
        let mut repo = MockUniverseRepository::new();
        repo.expect_create().never();

        let err = service(repo)
            .create_universe(CreateUniverseRequest {
                name: "   ".to_owned(),
            })
            .await
            .expect_err("blank");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let mut repo = MockUniverseRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_delete().returning(|_| Ok(false));
        repo.expect_find_resource().returning(|_| Ok(None));
        let service = service(repo);

        let id = Uuid::new_v4();
        assert_eq!(
            service.find_universe(id).await.expect_err("missing").code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            service.delete_universe(id).await.expect_err("missing").code(),
            ErrorCode::NotFound
        );
        let err = service.find_resource(id).await.expect_err("missing");
        assert_eq!(err.message(), "No such resource");
    }
}
