//! Building action lifecycle against the in-memory store.

use std::sync::Arc;

use chrono::TimeDelta;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::catch_up_service::CatchUpService;
use crate::domain::game::{Planet, PlanetRows, PlanetSnapshot, Player, Universe, standard_catalogue};
use crate::domain::ports::{PlayerRepository, UniverseRepository};
use crate::domain::ErrorCode;
use crate::outbound::memory::MemoryStore;
use crate::test_support::{MutableClock, building_id, epoch, resource_id};

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<MutableClock>,
    service: BuildingActionService<MemoryStore>,
    planet: Uuid,
}

impl Harness {
    async fn snapshot(&self) -> PlanetSnapshot {
        let mut tx = self.store.begin().await.expect("tx");
        tx.load_planet_snapshot(self.planet).await.expect("snapshot")
    }

    async fn amount(&self, name: &str) -> f64 {
        let snapshot = self.snapshot().await;
        let resource = resource_id(&snapshot, name);
        snapshot.resource(resource).map_or(f64::NAN, |row| row.amount)
    }

    async fn building(&self, name: &str) -> Uuid {
        building_id(&self.snapshot().await, name)
    }
}

#[fixture]
async fn harness() -> Harness {
    let clock = Arc::new(MutableClock::new(epoch()));
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let universe = Universe {
        id: Uuid::new_v4(),
        name: "milky way".to_owned(),
        created_at: epoch(),
        updated_at: epoch(),
        version: 0,
    };
    let catalogue = standard_catalogue(universe.id, epoch());
    UniverseRepository::create(store.as_ref(), &universe, &catalogue)
        .await
        .expect("universe");
    let player = Player {
        id: Uuid::new_v4(),
        api_user: Uuid::new_v4(),
        universe: universe.id,
        name: "vega".to_owned(),
        created_at: epoch(),
        updated_at: epoch(),
        version: 0,
    };
    let planet = Planet {
        id: Uuid::new_v4(),
        player: player.id,
        name: "homeworld".to_owned(),
        homeworld: true,
        created_at: epoch(),
        updated_at: epoch(),
        version: 0,
    };
    let rows = PlanetRows::initial(planet.id, &catalogue, epoch());
    PlayerRepository::create(store.as_ref(), &player, &planet, &rows)
        .await
        .expect("player");

    let service = BuildingActionService::new(
        Arc::clone(&store),
        Arc::new(PlanetGate::default()),
        clock.clone(),
    );
    Harness {
        store,
        clock,
        service,
        planet: planet.id,
    }
}

#[rstest]
#[tokio::test]
async fn creating_an_action_debits_its_cost(#[future] harness: Harness) {
    let harness = harness.await;
    let mine = harness.building("metal mine").await;

    let action = harness
        .service
        .create_action(harness.planet, mine)
        .await
        .expect("created");

    assert_eq!(action.current_level, 0);
    assert_eq!(action.desired_level, 1);
    assert_eq!(action.created_at, epoch());
    assert_eq!(
        action.completed_at - action.created_at,
        TimeDelta::nanoseconds(75 * 1_440_000_000)
    );
    assert_eq!(harness.amount("metal").await, 440.0);
    assert_eq!(harness.amount("crystal").await, 485.0);
}

#[rstest]
#[tokio::test]
async fn cancelling_refunds_the_cost(#[future] harness: Harness) {
    let harness = harness.await;
    let mine = harness.building("crystal mine").await;
    let action = harness
        .service
        .create_action(harness.planet, mine)
        .await
        .expect("created");

    harness
        .service
        .delete_action(action.id)
        .await
        .expect("cancelled");

    assert_eq!(harness.amount("metal").await, 500.0);
    assert_eq!(harness.amount("crystal").await, 500.0);
    assert_eq!(harness.store.action_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn a_second_action_on_the_same_building_conflicts(#[future] harness: Harness) {
    let harness = harness.await;
    let mine = harness.building("metal mine").await;
    harness
        .service
        .create_action(harness.planet, mine)
        .await
        .expect("first");

    let err = harness
        .service
        .create_action(harness.planet, mine)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "Building action already exists");
    assert_eq!(harness.amount("metal").await, 440.0);
}

#[rstest]
#[tokio::test]
async fn unaffordable_actions_are_rejected(#[future] harness: Harness) {
    let harness = harness.await;
    let storage = harness.building("metal storage").await;

    let err = harness
        .service
        .create_action(harness.planet, storage)
        .await
        .expect_err("too expensive");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Not enough resources");
    assert_eq!(harness.amount("metal").await, 500.0);
}

#[rstest]
#[case::unknown_building(true)]
#[case::unknown_planet(false)]
#[tokio::test]
async fn unknown_targets_are_reported(#[future] harness: Harness, #[case] known_planet: bool) {
    let harness = harness.await;
    let mine = harness.building("metal mine").await;
    let (planet, building) = if known_planet {
        (harness.planet, Uuid::new_v4())
    } else {
        (Uuid::new_v4(), mine)
    };

    let err = harness
        .service
        .create_action(planet, building)
        .await
        .expect_err("unknown");

    let expected = if known_planet {
        ErrorCode::InvalidRequest
    } else {
        ErrorCode::NotFound
    };
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn completed_actions_can_no_longer_be_cancelled(#[future] harness: Harness) {
    let harness = harness.await;
    let mine = harness.building("metal mine").await;
    let action = harness
        .service
        .create_action(harness.planet, mine)
        .await
        .expect("created");
    harness.clock.advance(TimeDelta::minutes(10));

    let err = harness
        .service
        .delete_action(action.id)
        .await
        .expect_err("already completed");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "No such action");

    let catch_up = CatchUpService::new(Arc::clone(&harness.store), Arc::new(PlanetGate::default()));
    catch_up
        .catch_up_planet(harness.planet, harness.clock.utc())
        .await
        .expect("caught up");
    let snapshot = harness.snapshot().await;
    assert_eq!(snapshot.building_level(mine), 1);
    assert!(snapshot.actions.is_empty());
}

#[rstest]
#[tokio::test]
async fn cancelling_an_unknown_action_is_not_found(#[future] harness: Harness) {
    let harness = harness.await;

    let err = harness
        .service
        .delete_action(Uuid::new_v4())
        .await
        .expect_err("unknown");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn concurrent_duplicates_debit_once(#[future] harness: Harness) {
    let harness = harness.await;
    let mine = harness.building("metal mine").await;

    let (first, second) = tokio::join!(
        harness.service.create_action(harness.planet, mine),
        harness.service.create_action(harness.planet, mine),
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let err = first.err().or(second.err()).expect("one conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(harness.amount("metal").await, 440.0);
}
