//! Player handlers.
//!
//! ```text
//! POST   /players
//! GET    /players[?apiUser=uuid]
//! GET    /players/{id}
//! DELETE /players/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::CreatePlayerRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{PlayerRequest, PlayerResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_uuid, parse_uuid, require_uuid,
};

const ID: FieldName = FieldName::new("id");
const API_USER: FieldName = FieldName::new("apiUser");
const UNIVERSE: FieldName = FieldName::new("universe");
const NAME: FieldName = FieldName::new("name");

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFilter {
    /// Only list players registered by this API user.
    pub api_user: Option<String>,
}

/// Register a player, creating its homeworld.
#[utoipa::path(
    post,
    path = "/players",
    request_body = PlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such universe", body = Error),
        (status = 409, description = "Name already used", body = Error)
    ),
    tags = ["players"],
    operation_id = "createPlayer"
)]
#[post("/players")]
pub async fn create_player(
    state: web::Data<HttpState>,
    payload: web::Json<PlayerRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = CreatePlayerRequest {
        api_user: require_uuid(payload.api_user, API_USER)?,
        universe: require_uuid(payload.universe, UNIVERSE)?,
        name: payload.name.ok_or_else(|| missing_field_error(NAME))?,
    };
    let player = state.players.create_player(request).await?;
    Ok(HttpResponse::Created().json(PlayerResponse::from(player)))
}

#[utoipa::path(
    get,
    path = "/players",
    params(PlayerFilter),
    responses(
        (status = 200, description = "Matching players", body = [PlayerResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["players"],
    operation_id = "listPlayers"
)]
#[get("/players")]
pub async fn list_players(
    state: web::Data<HttpState>,
    filter: web::Query<PlayerFilter>,
) -> ApiResult<HttpResponse> {
    let api_user = parse_optional_uuid(filter.api_user.as_deref(), API_USER)?;
    let players = state.players_query.list_players(api_user).await?;
    let body: Vec<PlayerResponse> = players.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/players/{id}",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such player", body = Error)
    ),
    tags = ["players"],
    operation_id = "getPlayer"
)]
#[get("/players/{id}")]
pub async fn get_player(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let player = state.players_query.find_player(id).await?;
    Ok(HttpResponse::Ok().json(PlayerResponse::from(player)))
}

/// Delete a player with its planets.
#[utoipa::path(
    delete,
    path = "/players/{id}",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 204, description = "Player deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such player", body = Error)
    ),
    tags = ["players"],
    operation_id = "deletePlayer"
)]
#[delete("/players/{id}")]
pub async fn delete_player(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.players.delete_player(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
