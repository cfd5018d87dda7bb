//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: an in-process store for development and tests
//! - **persistence**: PostgreSQL-backed store and repositories using Diesel
//!
//! Adapters translate between domain types and storage representations. They
//! contain no simulation rules.

pub mod memory;
pub mod persistence;
