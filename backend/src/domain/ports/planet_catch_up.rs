//! Driving port used by the HTTP watcher to bring a planet up to date.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Error;

/// Advance a planet to the later of `now` and the store's own clock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanetCatchUp: Send + Sync {
    async fn catch_up(&self, planet: Uuid, now: DateTime<Utc>) -> Result<(), Error>;
}
