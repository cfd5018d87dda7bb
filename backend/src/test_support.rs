//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and the integration suites in `tests/`,
//! which enable the `test-support` feature.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::game::{Planet, PlanetRows, PlanetSnapshot, standard_catalogue};

/// A clock tests can move forward by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant most scenarios start from.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Snapshot of a fresh planet on the standard catalogue, with every row
/// stamped at `at`.
pub fn planet_snapshot(at: DateTime<Utc>) -> PlanetSnapshot {
    let universe = Uuid::new_v4();
    let catalogue = standard_catalogue(universe, at);
    let planet = Planet {
        id: Uuid::new_v4(),
        player: Uuid::new_v4(),
        name: "homeworld".to_owned(),
        homeworld: true,
        created_at: at,
        updated_at: at,
        version: 0,
    };
    let rows = PlanetRows::initial(planet.id, &catalogue, at);

    PlanetSnapshot {
        planet,
        universe,
        resources: rows.resources,
        productions: rows.productions,
        storages: rows.storages,
        buildings: rows.buildings,
        actions: Vec::new(),
        catalogue,
    }
}

/// Resource id for `name` in the snapshot's catalogue.
///
/// # Panics
///
/// Panics when the catalogue lacks the resource.
pub fn resource_id(snapshot: &PlanetSnapshot, name: &str) -> Uuid {
    match snapshot.catalogue.resource_by_name(name) {
        Some(resource) => resource.id,
        None => panic!("catalogue has no resource named {name}"),
    }
}

/// Building id for `name` in the snapshot's catalogue.
///
/// # Panics
///
/// Panics when the catalogue lacks the building.
pub fn building_id(snapshot: &PlanetSnapshot, name: &str) -> Uuid {
    match snapshot.catalogue.building_by_name(name) {
        Some(building) => building.id,
        None => panic!("catalogue has no building named {name}"),
    }
}
