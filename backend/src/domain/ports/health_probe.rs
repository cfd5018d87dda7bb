//! Driving port behind `/healthcheck`.

use async_trait::async_trait;

use crate::domain::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Succeeds when the backing store answers.
    async fn check(&self) -> Result<(), Error>;
}
