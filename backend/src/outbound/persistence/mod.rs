//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides the game store and the repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: adapters translate between Diesel rows and domain
//!   types. Simulation rules stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database errors are mapped onto each port's
//!   error type; constraint violations become domain conflicts.
//!
//! # Example
//!
//! ```ignore
//! use stellar_backend::outbound::persistence::{DbPool, DieselGameStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/stellar")).await?;
//! let store = DieselGameStore::new(pool);
//! ```

mod diesel_api_key_repository;
mod diesel_authorization_repository;
mod diesel_basic_error_mapping;
mod diesel_game_rows;
mod diesel_game_store;
mod diesel_planet_repository;
mod diesel_player_repository;
mod diesel_universe_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_api_key_repository::DieselApiKeyRepository;
pub use diesel_authorization_repository::DieselAuthorizationRepository;
pub use diesel_game_store::{DieselGameStore, DieselTransaction};
pub use diesel_planet_repository::DieselPlanetRepository;
pub use diesel_player_repository::DieselPlayerRepository;
pub use diesel_universe_repository::DieselUniverseRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
