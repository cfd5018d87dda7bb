//! Helpers shared by services that write through a [`GameTransaction`].

use std::future::Future;

use tracing::{debug, warn};

use super::game::GameError;
use super::ports::GameTransaction;

/// Attempts made for one unit of work before a lost optimistic lock is
/// reported to the caller.
pub const MAX_TRANSACTION_ATTEMPTS: usize = 3;

/// Run `attempt` until it succeeds, fails with a non-retryable error, or
/// has been tried [`MAX_TRANSACTION_ATTEMPTS`] times.
///
/// Each call of `attempt` must open its own transaction so the retry sees a
/// fresh snapshot.
pub async fn with_conflict_retry<T, F, Fut>(mut attempt: F) -> Result<T, GameError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GameError>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Err(error) if error.is_retryable() && tries < MAX_TRANSACTION_ATTEMPTS => {
                debug!(attempt = tries, %error, "retrying store transaction");
                tries += 1;
            }
            outcome => return outcome,
        }
    }
}

/// Commit on success, roll back on failure, and hand `result` back.
///
/// A failed rollback is logged; the original error wins.
pub async fn finish<T>(
    tx: &mut dyn GameTransaction,
    result: Result<T, GameError>,
) -> Result<T, GameError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(%rollback, %error, "store rollback failed");
            }
            Err(error)
        }
    }
}
