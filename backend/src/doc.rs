//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every game endpoint, the DTO schemas and the
//! `X-Api-Key` security scheme. Paths are relative to the configured base
//! path, which [`ApiDoc::for_base_path`] records as the document's server.
//! Swagger UI serves the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::dto::{
    ApiKeyResponse, BuildingActionRequest, BuildingActionResponse, FullPlanetResponse,
    FullUniverseResponse, PlanetRequest, PlanetResponse, PlayerRequest, PlayerResponse,
    ResourceResponse, UniverseRequest, UniverseResponse, UserRequest, UserResponse,
};

/// Enrich the generated document with the API key security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Api-Key",
                "UUID API key issued to an API user.",
            ))),
        );
    }
}

/// OpenAPI document for the game API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Stellar backend API",
        description = "Universes, players, planets and building upgrades with lazy catch-up."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ApiKey" = [])),
    paths(
        crate::inbound::http::universes::create_universe,
        crate::inbound::http::universes::list_universes,
        crate::inbound::http::universes::get_universe,
        crate::inbound::http::universes::delete_universe,
        crate::inbound::http::universes::list_resources,
        crate::inbound::http::universes::get_resource,
        crate::inbound::http::players::create_player,
        crate::inbound::http::players::list_players,
        crate::inbound::http::players::get_player,
        crate::inbound::http::players::delete_player,
        crate::inbound::http::planets::create_planet,
        crate::inbound::http::planets::list_planets,
        crate::inbound::http::planets::get_planet,
        crate::inbound::http::planets::delete_planet,
        crate::inbound::http::actions::create_action,
        crate::inbound::http::actions::delete_action,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::login,
        crate::inbound::http::users::login_by_id,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::logout,
        crate::inbound::http::auth::authorize,
        crate::inbound::http::health::healthcheck,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UniverseRequest,
        UniverseResponse,
        FullUniverseResponse,
        ResourceResponse,
        PlayerRequest,
        PlayerResponse,
        PlanetRequest,
        PlanetResponse,
        FullPlanetResponse,
        BuildingActionRequest,
        BuildingActionResponse,
        UserRequest,
        UserResponse,
        ApiKeyResponse,
    )),
    tags(
        (name = "universes", description = "Universes and their catalogues"),
        (name = "resources", description = "Resources across universes"),
        (name = "players", description = "Players registered by API users"),
        (name = "planets", description = "Planets, caught up on read"),
        (name = "actions", description = "Building upgrades"),
        (name = "users", description = "API users and their sessions"),
        (name = "auth", description = "Key checks for gateways"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document with `base_path` as its only server, so paths resolve
    /// where the app actually mounts them.
    pub fn for_base_path(base_path: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        let url = if base_path.is_empty() { "/" } else { base_path };
        doc.servers = Some(vec![Server::new(url)]);
        doc
    }
}

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn full_planet_schema_lists_building_actions() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let planet = schemas.get("FullPlanetResponse").expect("planet schema");

        assert_object_schema_has_field(planet, "buildingActions");
        assert_object_schema_has_field(planet, "resources");
    }

    #[test]
    fn every_game_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/universes",
            "/universes/{id}",
            "/planets/{id}",
            "/planets/{id}/actions",
            "/actions/{id}",
            "/users",
            "/users/{id}",
            "/users/sessions",
            "/users/sessions/{id}",
            "/auth",
            "/healthcheck",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(
            doc.paths.paths.keys().all(|path| !path.starts_with("/v1/")),
            "paths must be relative to the base path"
        );
    }

    #[test]
    fn server_follows_the_base_path() {
        let doc = ApiDoc::for_base_path("/v2/game");
        let servers = doc.servers.expect("servers");
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].url, "/v2/game");

        let root = ApiDoc::for_base_path("");
        assert_eq!(root.servers.expect("servers")[0].url, "/");
    }

    #[test]
    fn user_schema_hides_the_password() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("UserResponse").expect("user schema");

        assert_object_schema_has_field(user, "email");
        match user {
            RefOr::T(Schema::Object(obj)) => assert!(!obj.properties.contains_key("password")),
            _ => panic!("expected Object schema"),
        }
    }
}
