//! `DieselGameStore` against embedded PostgreSQL: versioned writes, planet
//! locks, the one-action-per-building rule and snapshot cascades.

#[path = "support/cluster_skip.rs"]
mod cluster_skip;
#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;
#[path = "support/pg_embed.rs"]
mod pg_embed;

use chrono::Utc;
use rstest::{fixture, rstest};
use uuid::Uuid;

use embedded_postgres::{DbContext, db_context};
use stellar_backend::domain::game::{
    FullUniverse, GameError, Planet, PlanetRows, Player, Universe, Upsert, derive_action,
    standard_catalogue,
};
use stellar_backend::domain::ports::{GameStore, PlayerRepository, UniverseRepository};
use stellar_backend::outbound::persistence::{
    DieselGameStore, DieselPlayerRepository, DieselUniverseRepository,
};

struct World {
    db: DbContext,
    store: DieselGameStore,
    universe: FullUniverse,
    planet: Uuid,
}

fn seed(db: DbContext) -> World {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let universe = FullUniverse {
        universe: Universe {
            id,
            name: format!("universe-{id}"),
            created_at: now,
            updated_at: now,
            version: 0,
        },
        catalogue: standard_catalogue(id, now),
    };
    let player = Player {
        id: Uuid::new_v4(),
        api_user: Uuid::new_v4(),
        universe: id,
        name: "zorg".to_owned(),
        created_at: now,
        updated_at: now,
        version: 0,
    };
    let planet = Planet {
        id: Uuid::new_v4(),
        player: player.id,
        name: "Homeworld".to_owned(),
        homeworld: true,
        created_at: now,
        updated_at: now,
        version: 0,
    };
    let rows = PlanetRows::initial(planet.id, &universe.catalogue, now);

    let universes = DieselUniverseRepository::new(db.pool.clone());
    let players = DieselPlayerRepository::new(db.pool.clone());
    db.runtime.block_on(async {
        universes
            .create(&universe.universe, &universe.catalogue)
            .await
            .expect("universe");
        players
            .create(&player, &planet, &rows)
            .await
            .expect("player");
    });

    World {
        store: DieselGameStore::new(db.pool.clone()),
        db,
        universe,
        planet: planet.id,
    }
}

#[fixture]
fn world() -> Option<World> {
    db_context().map(seed)
}

#[rstest]
fn snapshot_reads_back_the_initial_rows(world: Option<World>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: snapshot_reads_back_the_initial_rows skipped");
        return;
    };

    let snapshot = world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        tx.lock_planet(world.planet).await.expect("lock");
        tx.load_planet_snapshot(world.planet).await.expect("snapshot")
    });

    assert_eq!(snapshot.universe, world.universe.universe.id);
    assert_eq!(snapshot.resources.len(), world.universe.catalogue.resources.len());
    assert_eq!(snapshot.buildings.len(), world.universe.catalogue.buildings.len());
    assert!(snapshot.productions.iter().all(|row| row.building.is_none()));
    assert!(snapshot.actions.is_empty());
}

#[rstest]
fn stale_versions_lose_the_optimistic_lock(world: Option<World>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: stale_versions_lose_the_optimistic_lock skipped");
        return;
    };

    world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        let mut snapshot = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        snapshot.resources[0].amount += 10.0;
        tx.persist_resource_updates(&snapshot.resources[..1])
            .await
            .expect("first update");
        tx.commit().await.expect("commit");

        let mut tx = world.store.begin().await.expect("tx");
        let err = tx
            .persist_resource_updates(&snapshot.resources[..1])
            .await
            .expect_err("stale version");
        assert_eq!(err, GameError::optimistic_lock("planets_resources"));
        tx.rollback().await.expect("rollback");

        let mut tx = world.store.begin().await.expect("tx");
        let reread = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        assert_eq!(reread.resources[0].version, snapshot.resources[0].version + 1);
        assert_eq!(reread.resources[0].amount, snapshot.resources[0].amount);
    });
}

#[rstest]
fn base_production_rows_update_through_their_null_building(world: Option<World>) {
    let Some(world) = world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: base_production_rows_update_through_their_null_building skipped"
        );
        return;
    };

    world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        let snapshot = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        let mut base = snapshot.productions[0].clone();
        assert!(base.building.is_none());
        base.production += 7;
        tx.persist_production_updates(&[Upsert::Update(base.clone())])
            .await
            .expect("base row matched");
        tx.commit().await.expect("commit");

        let mut tx = world.store.begin().await.expect("tx");
        let reread = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        let row = reread
            .productions
            .iter()
            .find(|row| row.resource == base.resource && row.building.is_none())
            .expect("base row");
        assert_eq!(row.production, base.production);
        assert_eq!(row.version, base.version + 1);

        let err = tx
            .persist_production_updates(&[Upsert::Update(base)])
            .await
            .expect_err("stale base row");
        assert_eq!(err, GameError::optimistic_lock("planets_resources_productions"));
    });
}

#[rstest]
fn missing_planets_cannot_be_locked(world: Option<World>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: missing_planets_cannot_be_locked skipped");
        return;
    };

    let ghost = Uuid::new_v4();
    let result = world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        tx.lock_planet(ghost).await
    });

    assert_eq!(result, Err(GameError::no_such_planet(ghost)));
}

#[rstest]
fn second_action_on_a_building_is_a_duplicate(world: Option<World>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: second_action_on_a_building_is_a_duplicate skipped");
        return;
    };
    let building = world.universe.catalogue.buildings[0].id;

    world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        let snapshot = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        let first = derive_action(&snapshot, building, tx.timestamp()).expect("action");
        tx.insert_action(&first).await.expect("first action");
        tx.commit().await.expect("commit");

        let mut tx = world.store.begin().await.expect("tx");
        let second = derive_action(&snapshot, building, tx.timestamp()).expect("action");
        let err = tx.insert_action(&second).await.expect_err("duplicate");
        assert_eq!(err, GameError::duplicate_action(building));
        tx.rollback().await.expect("rollback");
    });
}

#[rstest]
fn deleting_an_action_cascades_to_its_snapshots(world: Option<World>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_an_action_cascades_to_its_snapshots skipped");
        return;
    };
    let building = world.universe.catalogue.buildings[0].id;

    let action = world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        let snapshot = tx.load_planet_snapshot(world.planet).await.expect("snapshot");
        let pending = derive_action(&snapshot, building, tx.timestamp()).expect("action");
        tx.insert_action(&pending).await.expect("insert");
        tx.commit().await.expect("commit");

        let mut tx = world.store.begin().await.expect("tx");
        let found = tx
            .find_action(pending.action.id)
            .await
            .expect("find")
            .expect("stored action");
        assert_eq!(found.costs.len(), pending.costs.len());
        assert_eq!(found.productions.len(), pending.productions.len());
        pending
    });
    assert!(!action.costs.is_empty());
    assert_eq!(
        world.db.count("SELECT count(*) FROM buildings_actions_costs"),
        i64::try_from(action.costs.len()).expect("small count")
    );

    world.db.runtime.block_on(async {
        let mut tx = world.store.begin().await.expect("tx");
        tx.delete_action_and_snapshots(action.action.id)
            .await
            .expect("delete");
        tx.commit().await.expect("commit");

        let mut tx = world.store.begin().await.expect("tx");
        assert_eq!(tx.find_action(action.action.id).await, Ok(None));
        assert_eq!(
            tx.delete_action_and_snapshots(action.action.id).await,
            Err(GameError::no_matching_rows())
        );
    });

    for table in [
        "buildings_actions_costs",
        "buildings_actions_resources_productions",
        "buildings_actions_resources_storages",
    ] {
        assert_eq!(
            world.db.count(&format!("SELECT count(*) FROM {table}")),
            0,
            "{table} should be empty"
        );
    }
}
