//! Driving port for starting and cancelling building upgrades.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::game::BuildingAction;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildingActionCommand: Send + Sync {
    /// Debit the upgrade cost and schedule the next level of `building`.
    async fn create_action(&self, planet: Uuid, building: Uuid) -> Result<BuildingAction, Error>;

    /// Cancel a pending upgrade and refund its cost.
    async fn delete_action(&self, action: Uuid) -> Result<(), Error>;
}
