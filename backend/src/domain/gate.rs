//! Per-planet gate serialising catch-up work inside the process.
//!
//! The gate keeps one async mutex per planet that currently has holders or
//! waiters. Entries are reference counted and disappear once the last permit
//! or waiter goes away, so the registry only tracks planets under load.
//! Cross-process exclusion is the store's row lock; the gate keeps requests
//! of one process from queueing on that lock.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, watch};
use tracing::debug;
use uuid::Uuid;

use super::game::GameError;

/// Default bound on the time spent waiting for a planet.
pub const DEFAULT_GATE_TIMEOUT: Duration = Duration::from_secs(5);

struct Slot {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

type Registry = Mutex<HashMap<Uuid, Slot>>;

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Claim on a registry entry, released on drop whether or not the planet
/// lock was obtained.
struct Reservation {
    registry: Arc<Registry>,
    planet: Uuid,
}

impl Reservation {
    fn new(registry: Arc<Registry>, planet: Uuid) -> (Self, Arc<AsyncMutex<()>>) {
        let lock = {
            let mut slots = lock_registry(&registry);
            let slot = slots.entry(planet).or_insert_with(|| Slot {
                lock: Arc::new(AsyncMutex::new(())),
                holders: 0,
            });
            slot.holders += 1;
            Arc::clone(&slot.lock)
        };
        (Self { registry, planet }, lock)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        let mut slots = lock_registry(&self.registry);
        if let Some(slot) = slots.get_mut(&self.planet) {
            slot.holders = slot.holders.saturating_sub(1);
            if slot.holders == 0 {
                slots.remove(&self.planet);
            }
        }
    }
}

/// Exclusive right to write one planet; released on drop.
pub struct PlanetPermit {
    // Field order matters: the planet lock is released before the registry
    // entry is given back.
    _guard: OwnedMutexGuard<()>,
    _reservation: Reservation,
    planet: Uuid,
}

impl PlanetPermit {
    /// Planet this permit covers.
    pub fn planet(&self) -> Uuid {
        self.planet
    }
}

impl std::fmt::Debug for PlanetPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanetPermit")
            .field("planet", &self.planet)
            .finish()
    }
}

/// Registry of per-planet locks.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use stellar_backend::domain::PlanetGate;
/// use uuid::Uuid;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let gate = PlanetGate::new(Duration::from_secs(1));
/// let planet = Uuid::new_v4();
/// let permit = gate.acquire(planet).await.expect("free planet");
/// assert_eq!(gate.holders(planet), 1);
/// drop(permit);
/// assert_eq!(gate.holders(planet), 0);
/// # });
/// ```
pub struct PlanetGate {
    registry: Arc<Registry>,
    timeout: Duration,
    closed: watch::Sender<bool>,
}

impl PlanetGate {
    /// Create a gate whose acquisitions give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
            timeout,
            closed,
        }
    }

    /// Wait for exclusive access to `planet`.
    ///
    /// # Errors
    ///
    /// [`GameError::Timeout`] after the configured bound and
    /// [`GameError::Cancelled`] once the gate is closed.
    pub async fn acquire(&self, planet: Uuid) -> Result<PlanetPermit, GameError> {
        self.acquire_until(planet, std::future::pending()).await
    }

    /// Like [`acquire`](Self::acquire), also giving up with
    /// [`GameError::Cancelled`] when `cancelled` completes first.
    ///
    /// Dropping the returned future while it waits leaves the registry as if
    /// the call never happened.
    ///
    /// # Errors
    ///
    /// See [`acquire`](Self::acquire).
    pub async fn acquire_until<C>(&self, planet: Uuid, cancelled: C) -> Result<PlanetPermit, GameError>
    where
        C: Future<Output = ()>,
    {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return Err(GameError::cancelled());
        }

        let (reservation, lock) = Reservation::new(Arc::clone(&self.registry), planet);
        tokio::select! {
            guard = lock.lock_owned() => Ok(PlanetPermit {
                _guard: guard,
                _reservation: reservation,
                planet,
            }),
            () = tokio::time::sleep(self.timeout) => {
                debug!(%planet, timeout_ms = self.timeout.as_millis(), "planet gate timed out");
                Err(GameError::timeout(planet))
            }
            () = cancelled => Err(GameError::cancelled()),
            _ = closed.wait_for(|closed| *closed) => Err(GameError::cancelled()),
        }
    }

    /// Cancel every waiter and refuse new acquisitions. Permits already
    /// handed out stay valid.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Number of permits and waiters currently registered for `planet`.
    pub fn holders(&self, planet: Uuid) -> usize {
        lock_registry(&self.registry)
            .get(&planet)
            .map_or(0, |slot| slot.holders)
    }

    /// Number of planets with at least one holder or waiter.
    pub fn tracked_planets(&self) -> usize {
        lock_registry(&self.registry).len()
    }
}

impl Default for PlanetGate {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_TIMEOUT)
    }
}
