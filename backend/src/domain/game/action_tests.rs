//! Unit coverage for action derivation, validation and cost bookkeeping.

use super::*;
use crate::test_support::{building_id, epoch, planet_snapshot, resource_id};
use chrono::TimeDelta;
use rstest::{fixture, rstest};

#[fixture]
fn snapshot() -> PlanetSnapshot {
    planet_snapshot(epoch())
}

fn set_level(snapshot: &mut PlanetSnapshot, building: Uuid, level: i32) {
    for row in snapshot
        .buildings
        .iter_mut()
        .filter(|row| row.building == building)
    {
        row.level = level;
    }
}

fn set_amount(snapshot: &mut PlanetSnapshot, resource: Uuid, amount: f64) {
    if let Some(row) = snapshot.resource_mut(resource) {
        row.amount = amount;
    }
}

#[rstest]
fn derives_first_level_from_catalogue(snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let metal = resource_id(&snapshot, "metal");
    let crystal = resource_id(&snapshot, "crystal");

    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");

    assert_eq!(pending.action.current_level, 0);
    assert_eq!(pending.action.desired_level, 1);
    assert_eq!(pending.action.planet, snapshot.planet.id);
    let cost_of = |resource| {
        pending
            .costs
            .iter()
            .find(|cost| cost.resource == resource)
            .map(|cost| cost.amount)
    };
    assert_eq!(cost_of(metal), Some(60));
    assert_eq!(cost_of(crystal), Some(15));
    assert_eq!(pending.productions.len(), 1);
    assert_eq!(pending.productions[0].production, 30);
    assert!(pending.storages.is_empty());
    assert!(pending.costs.iter().all(|cost| cost.action == pending.action.id));
}

#[rstest]
fn completion_follows_metal_and_crystal_costs(snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");

    let elapsed = pending.action.completed_at - pending.action.created_at;
    assert_eq!(elapsed, TimeDelta::nanoseconds(75 * 1_440_000_000));
    assert!(pending.action.completed_at > pending.action.created_at);
}

#[rstest]
fn derives_next_level_from_current_level(mut snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let metal = resource_id(&snapshot, "metal");
    set_level(&mut snapshot, mine, 2);

    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");

    assert_eq!(pending.action.current_level, 2);
    assert_eq!(pending.action.desired_level, 3);
    let metal_cost = pending
        .costs
        .iter()
        .find(|cost| cost.resource == metal)
        .map(|cost| cost.amount);
    assert_eq!(metal_cost, Some(135));
    assert_eq!(pending.productions[0].production, 36);
}

#[rstest]
fn storage_buildings_snapshot_new_caps(snapshot: PlanetSnapshot) {
    let storage = building_id(&snapshot, "metal storage");
    let pending = derive_action(&snapshot, storage, epoch()).expect("derivable");

    assert_eq!(pending.storages.len(), 1);
    assert_eq!(pending.storages[0].storage, 20_000);
    assert!(pending.productions.is_empty());
}

#[rstest]
fn unknown_building_is_rejected(snapshot: PlanetSnapshot) {
    let unknown = Uuid::new_v4();
    let err = derive_action(&snapshot, unknown, epoch()).expect_err("not in catalogue");
    assert_eq!(err, GameError::no_such_building(unknown));
}

#[rstest]
fn validation_accepts_affordable_action(snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");
    assert_eq!(validate_action(&snapshot, &pending), Ok(()));
}

#[rstest]
fn validation_rejects_insufficient_stockpile(mut snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let metal = resource_id(&snapshot, "metal");
    set_amount(&mut snapshot, metal, 59.5);

    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");
    assert_eq!(
        validate_action(&snapshot, &pending),
        Err(GameError::not_enough_resources(metal))
    );
}

#[rstest]
fn validation_rejects_second_action_on_building(mut snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let first = derive_action(&snapshot, mine, epoch()).expect("derivable");
    snapshot.actions.push(first);

    let second = derive_action(&snapshot, mine, epoch()).expect("derivable");
    assert_eq!(
        validate_action(&snapshot, &second),
        Err(GameError::duplicate_action(mine))
    );
}

#[rstest]
fn debit_then_credit_restores_stockpiles(mut snapshot: PlanetSnapshot) {
    let mine = building_id(&snapshot, "metal mine");
    let metal = resource_id(&snapshot, "metal");
    let crystal = resource_id(&snapshot, "crystal");
    let pending = derive_action(&snapshot, mine, epoch()).expect("derivable");

    let debited = debit_costs(&mut snapshot, &pending).expect("debit");
    assert_eq!(debited.len(), 2);
    assert_eq!(snapshot.resource(metal).map(|row| row.amount), Some(440.0));
    assert_eq!(snapshot.resource(crystal).map(|row| row.amount), Some(485.0));

    credit_costs(&mut snapshot, &pending).expect("credit");
    assert_eq!(snapshot.resource(metal).map(|row| row.amount), Some(500.0));
    assert_eq!(snapshot.resource(crystal).map(|row| row.amount), Some(500.0));
}
