//! Planet handlers.
//!
//! ```text
//! POST   /planets
//! GET    /planets[?player=uuid]
//! GET    /planets/{id}            (caught up first)
//! DELETE /planets/{id}            (caught up first)
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::CreatePlanetRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{FullPlanetResponse, PlanetRequest, PlanetResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_uuid, parse_uuid, require_uuid,
};
use crate::inbound::http::watcher::GameUpdateWatcher;

const ID: FieldName = FieldName::new("id");
const PLAYER: FieldName = FieldName::new("player");
const NAME: FieldName = FieldName::new("name");

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlanetFilter {
    /// Only list planets owned by this player.
    pub player: Option<String>,
}

#[utoipa::path(
    post,
    path = "/planets",
    request_body = PlanetRequest,
    responses(
        (status = 201, description = "Planet created", body = PlanetResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such player", body = Error)
    ),
    tags = ["planets"],
    operation_id = "createPlanet"
)]
#[post("/planets")]
pub async fn create_planet(
    state: web::Data<HttpState>,
    payload: web::Json<PlanetRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = CreatePlanetRequest {
        player: require_uuid(payload.player, PLAYER)?,
        name: payload.name.ok_or_else(|| missing_field_error(NAME))?,
    };
    let planet = state.planets.create_planet(request).await?;
    Ok(HttpResponse::Created().json(PlanetResponse::from(planet)))
}

#[utoipa::path(
    get,
    path = "/planets",
    params(PlanetFilter),
    responses(
        (status = 200, description = "Matching planets", body = [PlanetResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["planets"],
    operation_id = "listPlanets"
)]
#[get("/planets")]
pub async fn list_planets(
    state: web::Data<HttpState>,
    filter: web::Query<PlanetFilter>,
) -> ApiResult<HttpResponse> {
    let player = parse_optional_uuid(filter.player.as_deref(), PLAYER)?;
    let planets = state.planets_query.list_planets(player).await?;
    let body: Vec<PlanetResponse> = planets.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a planet with every row it owns, after catching it up.
#[utoipa::path(
    get,
    path = "/planets/{id}",
    params(("id" = String, Path, description = "Planet id")),
    responses(
        (status = 200, description = "Planet and its rows", body = FullPlanetResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such planet", body = Error),
        (status = 503, description = "Planet busy", body = Error)
    ),
    tags = ["planets"],
    operation_id = "getPlanet"
)]
#[get("/planets/{id}", wrap = "GameUpdateWatcher")]
pub async fn get_planet(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let planet = state.planets_query.find_planet(id).await?;
    Ok(HttpResponse::Ok().json(FullPlanetResponse::from(planet)))
}

#[utoipa::path(
    delete,
    path = "/planets/{id}",
    params(("id" = String, Path, description = "Planet id")),
    responses(
        (status = 204, description = "Planet deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such planet", body = Error)
    ),
    tags = ["planets"],
    operation_id = "deletePlanet"
)]
#[delete("/planets/{id}", wrap = "GameUpdateWatcher")]
pub async fn delete_planet(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.planets.delete_planet(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
