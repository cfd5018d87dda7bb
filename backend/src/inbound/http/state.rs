//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ApiKeyAuthenticator, Authorizer, BuildingActionCommand, HealthProbe, PlanetCatchUp,
    PlanetCommand, PlanetQuery, PlayerCommand, PlayerQuery, UniverseCommand, UniverseQuery,
    UserCommand, UserQuery,
};

/// Dependency bundle for HTTP handlers and the request middleware.
#[derive(Clone)]
pub struct HttpState {
    pub universes: Arc<dyn UniverseCommand>,
    pub universes_query: Arc<dyn UniverseQuery>,
    pub players: Arc<dyn PlayerCommand>,
    pub players_query: Arc<dyn PlayerQuery>,
    pub planets: Arc<dyn PlanetCommand>,
    pub planets_query: Arc<dyn PlanetQuery>,
    pub actions: Arc<dyn BuildingActionCommand>,
    pub catch_up: Arc<dyn PlanetCatchUp>,
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub authorizer: Arc<dyn Authorizer>,
    pub authenticator: Arc<dyn ApiKeyAuthenticator>,
    pub health: Arc<dyn HealthProbe>,
    /// Caller time handed to the catch-up engine.
    pub clock: Arc<dyn Clock>,
}
