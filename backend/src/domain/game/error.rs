//! Failures raised by the simulation core and its store.

use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::define_port_error;

define_port_error! {
    /// Errors raised while advancing planets or handling building actions.
    pub enum GameError {
        /// The addressed planet does not exist.
        NoSuchPlanet { planet: Uuid } => "no such planet {planet}",
        /// The building is not part of the planet's universe catalogue.
        NoSuchBuilding { building: Uuid } => "no such building {building}",
        /// A resource required by the operation is missing.
        NoSuchResource { resource: String } => "no such resource {resource}",
        /// The planet cannot pay for the action.
        NotEnoughResources { resource: Uuid } => "not enough {resource} to pay for the action",
        /// The planet already upgrades this building.
        DuplicateAction { building: Uuid } => "building {building} already has an action in progress",
        /// The addressed row is gone.
        NoMatchingRows => "no matching rows",
        /// A versioned update lost a race.
        OptimisticLock { table: String } => "concurrent update detected on {table}",
        /// The planet gate could not be acquired in time.
        Timeout { planet: Uuid } => "timed out waiting for planet {planet}",
        /// The caller or the server gave up while waiting.
        Cancelled => "operation cancelled",
        /// The store could not be reached.
        Connection { message: String } => "game store connection failed: {message}",
        /// The store rejected or failed a query.
        Query { message: String } => "game store query failed: {message}",
    }
}

impl GameError {
    /// Whether a fresh transaction may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OptimisticLock { .. })
    }
}

impl From<GameError> for Error {
    fn from(error: GameError) -> Self {
        match error {
            GameError::NoSuchPlanet { .. } => Error::not_found("No such planet"),
            GameError::NoMatchingRows => Error::not_found("No such action"),
            GameError::NoSuchBuilding { building } => Error::invalid_request("No such building")
                .with_details(serde_json::json!({ "building": building })),
            GameError::NoSuchResource { resource } => Error::invalid_request("No such resource")
                .with_details(serde_json::json!({ "resource": resource })),
            GameError::NotEnoughResources { resource } => {
                Error::invalid_request("Not enough resources")
                    .with_details(serde_json::json!({ "resource": resource }))
            }
            GameError::DuplicateAction { .. } => Error::conflict("Building action already exists"),
            GameError::OptimisticLock { .. } => {
                Error::conflict("Planet was updated concurrently, please retry")
            }
            GameError::Timeout { .. } => {
                Error::service_unavailable("Planet is busy, please retry later")
            }
            GameError::Cancelled => Error::client_closed("Request cancelled"),
            GameError::Connection { .. } => Error::service_unavailable("Game store unavailable"),
            GameError::Query { message } => {
                tracing::error!(%message, "game store query failed");
                Error::internal("Failed to update game")
            }
        }
    }
}
