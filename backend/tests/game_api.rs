//! End-to-end behaviour of the game API on the in-memory store.

mod support;

use actix_web::http::{Method, StatusCode};
use chrono::TimeDelta;
use serde_json::json;
use uuid::Uuid;

use support::{Harness, amount, building_id, details, resource_id, seed_player, send};

#[actix_web::test]
async fn creating_a_universe_seeds_the_standard_catalogue() {
    let harness = Harness::new().await;
    let app = harness.app().await;

    let (universe, _, _) = seed_player(&harness, &app).await;

    assert_eq!(universe["resources"].as_array().map(Vec::len), Some(3));
    assert_eq!(universe["buildings"].as_array().map(Vec::len), Some(6));

    let id = universe["id"].as_str().unwrap_or_default();
    let (status, body) = send(
        &app,
        harness.request(Method::GET, &format!("/universes/{id}")).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details(&body)["name"], universe["name"]);
}

#[actix_web::test]
async fn duplicate_universe_names_conflict() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let create = || {
        harness
            .request(Method::POST, "/universes")
            .set_json(json!({ "name": "andromeda" }))
            .to_request()
    };

    let (first, _) = send(&app, create()).await;
    let (second, body) = send(&app, create()).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["Status"], "ERROR");
}

#[actix_web::test]
async fn new_player_owns_a_stocked_homeworld() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (universe, player, planet) = seed_player(&harness, &app).await;

    assert_eq!(planet["homeworld"], true);
    assert_eq!(planet["player"], player["id"]);

    let id = planet["id"].as_str().unwrap_or_default();
    let (status, body) = send(
        &app,
        harness.request(Method::GET, &format!("/planets/{id}")).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let full = details(&body);
    let metal = resource_id(&universe, "metal");
    assert_eq!(amount(full, &metal), 500.0);
    assert_eq!(full["buildingActions"], json!([]));
}

#[actix_web::test]
async fn players_are_filtered_by_api_user() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (_, player, _) = seed_player(&harness, &app).await;

    let mine = format!("/players?apiUser={}", harness.key.api_user);
    let (status, body) = send(&app, harness.request(Method::GET, &mine).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details(&body), &json!([player]));

    let theirs = format!("/players?apiUser={}", Uuid::new_v4());
    let (_, body) = send(&app, harness.request(Method::GET, &theirs).to_request()).await;
    assert_eq!(details(&body), &json!([]));

    let (status, _) = send(
        &app,
        harness
            .request(Method::GET, "/players?apiUser=nope")
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn player_in_unknown_universe_is_not_found() {
    let harness = Harness::new().await;
    let app = harness.app().await;

    let (status, body) = send(
        &app,
        harness
            .request(Method::POST, "/players")
            .set_json(json!({
                "apiUser": harness.key.api_user.to_string(),
                "universe": Uuid::new_v4().to_string(),
                "name": "ada",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(details(&body)["code"], "not_found");
}

#[actix_web::test]
async fn deleting_a_planet_removes_it() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (_, player, _) = seed_player(&harness, &app).await;

    let (status, body) = send(
        &app,
        harness
            .request(Method::POST, "/planets")
            .set_json(json!({ "player": player["id"], "name": "outpost" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = details(&body)["id"].as_str().unwrap_or_default().to_owned();
    assert_eq!(details(&body)["homeworld"], false);

    let path = format!("/planets/{id}");
    let (status, body) = send(&app, harness.request(Method::DELETE, &path).to_request()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, harness.request(Method::GET, &path).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn upgrade_debits_and_cancel_refunds() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (universe, _, planet) = seed_player(&harness, &app).await;
    let planet_id = planet["id"].as_str().unwrap_or_default().to_owned();
    let mine = building_id(&universe, "metal mine");
    let metal = resource_id(&universe, "metal");
    let crystal = resource_id(&universe, "crystal");

    let (status, body) = send(
        &app,
        harness
            .request(Method::POST, &format!("/planets/{planet_id}/actions"))
            .set_json(json!({ "building": mine }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let action = details(&body).clone();
    assert_eq!(action["currentLevel"], 0);
    assert_eq!(action["desiredLevel"], 1);

    let planet_path = format!("/planets/{planet_id}");
    let (_, body) = send(&app, harness.request(Method::GET, &planet_path).to_request()).await;
    let full = details(&body);
    assert_eq!(amount(full, &metal), 440.0);
    assert_eq!(amount(full, &crystal), 485.0);
    assert_eq!(full["buildingActions"].as_array().map(Vec::len), Some(1));

    let action_id = action["id"].as_str().unwrap_or_default();
    let (status, _) = send(
        &app,
        harness
            .request(Method::DELETE, &format!("/actions/{action_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, harness.request(Method::GET, &planet_path).to_request()).await;
    let full = details(&body);
    assert_eq!(amount(full, &metal), 500.0);
    assert_eq!(amount(full, &crystal), 500.0);
    assert_eq!(full["buildingActions"], json!([]));
    assert_eq!(harness.store.action_count().await, 0);
}

#[actix_web::test]
async fn completed_upgrade_raises_the_building_level() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (universe, _, planet) = seed_player(&harness, &app).await;
    let planet_id = planet["id"].as_str().unwrap_or_default().to_owned();
    let mine = building_id(&universe, "metal mine");

    let (status, _) = send(
        &app,
        harness
            .request(Method::POST, &format!("/planets/{planet_id}/actions"))
            .set_json(json!({ "building": mine }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    harness.clock.advance(TimeDelta::hours(1));
    let (_, body) = send(
        &app,
        harness
            .request(Method::GET, &format!("/planets/{planet_id}"))
            .to_request(),
    )
    .await;
    let full = details(&body);

    assert_eq!(full["buildingActions"], json!([]));
    let level = full["buildings"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["building"] == mine.as_str()))
        .map(|row| row["level"].clone());
    assert_eq!(level, Some(json!(1)));
    assert_eq!(harness.store.action_count().await, 0);
}

#[actix_web::test]
async fn upgrade_beyond_means_is_rejected() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (universe, _, planet) = seed_player(&harness, &app).await;
    let planet_id = planet["id"].as_str().unwrap_or_default().to_owned();
    let tank = building_id(&universe, "deuterium tank");

    let (status, body) = send(
        &app,
        harness
            .request(Method::POST, &format!("/planets/{planet_id}/actions"))
            .set_json(json!({ "building": tank }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(harness.store.action_count().await, 0);
}

#[actix_web::test]
async fn concurrent_duplicate_upgrades_debit_once() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (universe, _, planet) = seed_player(&harness, &app).await;
    let planet_id = planet["id"].as_str().unwrap_or_default().to_owned();
    let mine = building_id(&universe, "metal mine");
    let metal = resource_id(&universe, "metal");
    let create = || {
        harness
            .request(Method::POST, &format!("/planets/{planet_id}/actions"))
            .set_json(json!({ "building": mine }))
            .to_request()
    };

    let ((first, _), (second, _)) =
        futures::join!(send(&app, create()), send(&app, create()));

    let mut statuses = [first.as_u16(), second.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 409]);
    assert_eq!(harness.store.action_count().await, 1);

    let (_, body) = send(
        &app,
        harness
            .request(Method::GET, &format!("/planets/{planet_id}"))
            .to_request(),
    )
    .await;
    assert_eq!(amount(details(&body), &metal), 440.0);
}

#[actix_web::test]
async fn concurrent_reads_observe_one_catch_up() {
    let harness = Harness::new().await;
    let app = harness.app().await;
    let (_, _, planet) = seed_player(&harness, &app).await;
    let path = format!("/planets/{}", planet["id"].as_str().unwrap_or_default());
    harness.clock.advance(TimeDelta::hours(1));

    let ((first_status, first), (second_status, second)) = futures::join!(
        send(&app, harness.request(Method::GET, &path).to_request()),
        send(&app, harness.request(Method::GET, &path).to_request()),
    );

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(details(&first), details(&second));
    assert_ne!(first["RequestId"], second["RequestId"]);
    assert_eq!(harness.gate.tracked_planets(), 0);
}
