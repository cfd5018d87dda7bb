//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod api_key_authenticator;
mod api_key_repository;
mod authorization_repository;
mod building_action_command;
mod game_store;
mod health_probe;
mod planet_catch_up;
mod planet_command;
mod planet_repository;
mod player_command;
mod player_repository;
mod universe_command;
mod universe_repository;
mod user_command;
mod user_repository;

#[cfg(test)]
pub use api_key_authenticator::MockApiKeyAuthenticator;
pub use api_key_authenticator::ApiKeyAuthenticator;
#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
pub use api_key_repository::{ApiKeyRepository, ApiKeyRepositoryError};
#[cfg(test)]
pub use authorization_repository::MockAuthorizationRepository;
pub use authorization_repository::{AuthorizationRepository, AuthorizationRepositoryError};
pub use building_action_command::BuildingActionCommand;
#[cfg(test)]
pub use building_action_command::MockBuildingActionCommand;
pub use game_store::{GameStore, GameTransaction};
#[cfg(test)]
pub use game_store::{MockGameStore, MockGameTransaction};
pub use health_probe::HealthProbe;
#[cfg(test)]
pub use health_probe::MockHealthProbe;
#[cfg(test)]
pub use planet_catch_up::MockPlanetCatchUp;
pub use planet_catch_up::PlanetCatchUp;
pub use planet_command::{CreatePlanetRequest, PlanetCommand, PlanetQuery};
#[cfg(test)]
pub use planet_command::{MockPlanetCommand, MockPlanetQuery};
#[cfg(test)]
pub use planet_repository::MockPlanetRepository;
pub use planet_repository::{PlanetRepository, PlanetRepositoryError};
pub use player_command::{CreatePlayerRequest, PlayerCommand, PlayerQuery};
#[cfg(test)]
pub use player_command::{MockPlayerCommand, MockPlayerQuery};
#[cfg(test)]
pub use player_repository::MockPlayerRepository;
pub use player_repository::{PlayerRepository, PlayerRepositoryError};
pub use universe_command::{CreateUniverseRequest, UniverseCommand, UniverseQuery};
#[cfg(test)]
pub use universe_command::{MockUniverseCommand, MockUniverseQuery};
#[cfg(test)]
pub use universe_repository::MockUniverseRepository;
pub use universe_repository::{UniverseRepository, UniverseRepositoryError};
pub use user_command::{Authorizer, UserCommand, UserQuery};
#[cfg(test)]
pub use user_command::{MockAuthorizer, MockUserCommand, MockUserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
