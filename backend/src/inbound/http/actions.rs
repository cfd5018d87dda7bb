//! Building action handlers.
//!
//! ```text
//! POST   /planets/{id}/actions    (caught up first)
//! DELETE /actions/{id}            (caught up by the action's planet)
//! ```

use actix_web::{HttpResponse, delete, post, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{BuildingActionRequest, BuildingActionResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require_uuid};
use crate::inbound::http::watcher::GameUpdateWatcher;

const ID: FieldName = FieldName::new("id");
const BUILDING: FieldName = FieldName::new("building");

/// Start upgrading a building, paying its cost up front.
#[utoipa::path(
    post,
    path = "/planets/{id}/actions",
    params(("id" = String, Path, description = "Planet id")),
    request_body = BuildingActionRequest,
    responses(
        (status = 201, description = "Action started", body = BuildingActionResponse),
        (status = 400, description = "Not enough resources or no such building", body = Error),
        (status = 404, description = "No such planet", body = Error),
        (status = 409, description = "Building already upgrading", body = Error)
    ),
    tags = ["actions"],
    operation_id = "createBuildingAction"
)]
#[post("/planets/{id}/actions", wrap = "GameUpdateWatcher")]
pub async fn create_action(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<BuildingActionRequest>,
) -> ApiResult<HttpResponse> {
    let planet = parse_uuid(&path, ID)?;
    let building = require_uuid(payload.into_inner().building, BUILDING)?;
    let action = state.actions.create_action(planet, building).await?;
    Ok(HttpResponse::Created().json(BuildingActionResponse::from(action)))
}

/// Cancel an upgrade and refund its cost.
#[utoipa::path(
    delete,
    path = "/actions/{id}",
    params(("id" = String, Path, description = "Action id")),
    responses(
        (status = 204, description = "Action cancelled"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "No such action", body = Error)
    ),
    tags = ["actions"],
    operation_id = "deleteBuildingAction"
)]
#[delete("/actions/{id}")]
pub async fn delete_action(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, ID)?;
    state.actions.delete_action(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
