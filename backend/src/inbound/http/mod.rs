//! HTTP inbound adapter exposing the game API.

pub mod actions;
pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod planets;
pub mod players;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod universes;
pub mod users;
pub mod validation;
pub mod watcher;

pub use error::ApiResult;
