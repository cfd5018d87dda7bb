//! Domain types, the simulation core and the use-case services.
//!
//! Purpose: keep game rules free of transport and storage concerns. The
//! catch-up engine, action derivation and progression math are pure or talk
//! to the store only through [`ports::GameTransaction`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - `game`: universes, catalogue, players, planets and building actions.
//! - `catch_up`, `gate`: lazy planet advancement and per-planet exclusion.
//! - `user`: API users, credentials, ACLs and limits.
//! - Services implementing the driving ports in [`ports`].

pub mod action_service;
pub mod auth;
pub mod catch_up;
pub mod catch_up_service;
pub mod error;
pub mod game;
pub mod gate;
pub mod health_service;
pub mod planet_service;
pub mod player_service;
pub mod ports;
pub mod progression;
pub mod trace_id;
pub mod transaction;
pub mod universe_service;
pub mod user;
pub mod user_service;

pub use self::action_service::BuildingActionService;
pub use self::auth::{ApiKey, ApiKeyService};
pub use self::catch_up::{CatchUpPlan, advance, plan_catch_up};
pub use self::catch_up_service::CatchUpService;
pub use self::error::{Error, ErrorCode};
pub use self::gate::{DEFAULT_GATE_TIMEOUT, PlanetGate, PlanetPermit};
pub use self::health_service::StoreHealthProbe;
pub use self::planet_service::{PlanetCommandService, PlanetQueryService};
pub use self::player_service::{HOMEWORLD_NAME, PlayerService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::universe_service::UniverseService;
pub use self::user::{
    Acl, Authorization, Credentials, CredentialsError, Limit, PasswordHash, User,
};
pub use self::user_service::{AuthorizationService, DEFAULT_KEY_VALIDITY, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use stellar_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("No such planet"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
