//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use crate::domain::ports::{
    MockApiKeyAuthenticator, MockAuthorizer, MockBuildingActionCommand, MockHealthProbe,
    MockPlanetCatchUp, MockPlanetCommand, MockPlanetQuery, MockPlayerCommand, MockPlayerQuery,
    MockUniverseCommand, MockUniverseQuery, MockUserCommand, MockUserQuery,
};
use crate::inbound::http::state::HttpState;
use crate::test_support::{MutableClock, epoch};

/// Mocks behind every port of [`HttpState`]; set expectations, then build.
#[derive(Default)]
pub struct TestPorts {
    pub universes: MockUniverseCommand,
    pub universes_query: MockUniverseQuery,
    pub players: MockPlayerCommand,
    pub players_query: MockPlayerQuery,
    pub planets: MockPlanetCommand,
    pub planets_query: MockPlanetQuery,
    pub actions: MockBuildingActionCommand,
    pub catch_up: MockPlanetCatchUp,
    pub users: MockUserCommand,
    pub users_query: MockUserQuery,
    pub authorizer: MockAuthorizer,
    pub authenticator: MockApiKeyAuthenticator,
    pub health: MockHealthProbe,
}

pub fn test_state(ports: TestPorts) -> HttpState {
    HttpState {
        universes: Arc::new(ports.universes),
        universes_query: Arc::new(ports.universes_query),
        players: Arc::new(ports.players),
        players_query: Arc::new(ports.players_query),
        planets: Arc::new(ports.planets),
        planets_query: Arc::new(ports.planets_query),
        actions: Arc::new(ports.actions),
        catch_up: Arc::new(ports.catch_up),
        users: Arc::new(ports.users),
        users_query: Arc::new(ports.users_query),
        authorizer: Arc::new(ports.authorizer),
        authenticator: Arc::new(ports.authenticator),
        health: Arc::new(ports.health),
        clock: Arc::new(MutableClock::new(epoch())),
    }
}
