//! Health check endpoint, served outside API key authentication.

use actix_web::{HttpResponse, get, http::header, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Report whether the store answers.
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "Service healthy", body = String),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["health"],
    operation_id = "healthcheck"
)]
#[get("/healthcheck")]
pub async fn healthcheck(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.health.check().await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json("OK"))
}
