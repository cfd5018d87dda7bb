//! Universe and resource handlers.
//!
//! ```text
//! POST   /universes
//! GET    /universes
//! GET    /universes/{id}
//! DELETE /universes/{id}
//! GET    /resources
//! GET    /resources/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};

use crate::domain::Error;
use crate::domain::ports::CreateUniverseRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    FullUniverseResponse, ResourceResponse, UniverseRequest, UniverseResponse,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");

/// Create a universe seeded with the standard catalogue.
#[utoipa::path(
    post,
    path = "/universes",
    request_body = UniverseRequest,
    responses(
        (status = 201, description = "Universe created", body = FullUniverseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Name already used", body = Error)
    ),
    tags = ["universes"],
    operation_id = "createUniverse"
)]
#[post("/universes")]
pub async fn create_universe(
    state: web::Data<HttpState>,
    payload: web::Json<UniverseRequest>,
) -> ApiResult<HttpResponse> {
    let name = payload.into_inner().name.ok_or_else(|| missing_field_error(NAME))?;
    let universe = state
        .universes
        .create_universe(CreateUniverseRequest { name })
        .await?;
    Ok(HttpResponse::Created().json(FullUniverseResponse::from(universe)))
}

#[utoipa::path(
    get,
    path = "/universes",
    responses(
        (status = 200, description = "Every universe", body = [UniverseResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["universes"],
    operation_id = "listUniverses"
)]
#[get("/universes")]
pub async fn list_universes(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let universes = state.universes_query.list_universes().await?;
    let body: Vec<UniverseResponse> = universes.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a universe with its catalogue.
#[utoipa::path(
    get,
    path = "/universes/{id}",
    params(("id" = String, Path, description = "Universe id")),
    responses(
        (status = 200, description = "Universe and catalogue", body = FullUniverseResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such universe", body = Error)
    ),
    tags = ["universes"],
    operation_id = "getUniverse"
)]
#[get("/universes/{id}")]
pub async fn get_universe(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let universe = state.universes_query.find_universe(id).await?;
    Ok(HttpResponse::Ok().json(FullUniverseResponse::from(universe)))
}

#[utoipa::path(
    delete,
    path = "/universes/{id}",
    params(("id" = String, Path, description = "Universe id")),
    responses(
        (status = 204, description = "Universe deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such universe", body = Error)
    ),
    tags = ["universes"],
    operation_id = "deleteUniverse"
)]
#[delete("/universes/{id}")]
pub async fn delete_universe(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.universes.delete_universe(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/resources",
    responses(
        (status = 200, description = "Every resource", body = [ResourceResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["resources"],
    operation_id = "listResources"
)]
#[get("/resources")]
pub async fn list_resources(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let resources = state.universes_query.list_resources().await?;
    let body: Vec<ResourceResponse> = resources.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/resources/{id}",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource", body = ResourceResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such resource", body = Error)
    ),
    tags = ["resources"],
    operation_id = "getResource"
)]
#[get("/resources/{id}")]
pub async fn get_resource(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    let resource = state.universes_query.find_resource(id).await?;
    Ok(HttpResponse::Ok().json(ResourceResponse::from(resource)))
}
