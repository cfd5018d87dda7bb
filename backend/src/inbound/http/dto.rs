//! JSON payloads exchanged over the game API.
//!
//! Field names are camelCase. Domain types stay free of transport concerns;
//! every response type here is built from its domain counterpart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ApiKey, User};
use crate::domain::game::{
    Building, BuildingAction, BuildingCost, BuildingResourceProduction, BuildingResourceStorage,
    Catalogue, FullPlanet, FullUniverse, Planet, PlanetBuilding, PlanetResource,
    PlanetResourceProduction, PlanetResourceStorage, Player, Resource, Universe,
};

/// Request body for `POST /universes`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniverseRequest {
    #[schema(example = "milky way")]
    pub name: Option<String>,
}

/// Request body for `POST /players`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    pub api_user: Option<String>,
    pub universe: Option<String>,
    #[schema(example = "vega")]
    pub name: Option<String>,
}

/// Request body for `POST /planets`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRequest {
    pub player: Option<String>,
    #[schema(example = "Arrakis")]
    pub name: Option<String>,
}

/// Request body for `POST /planets/{id}/actions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingActionRequest {
    pub building: Option<String>,
}

/// Request body for `POST /users`, `PATCH /users/{id}` and
/// `POST /users/sessions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user as returned to clients; the password hash stays server side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

/// A freshly issued API key.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub key: Uuid,
    pub user: Uuid,
    pub valid_until: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(value: ApiKey) -> Self {
        Self {
            key: value.key,
            user: value.api_user,
            valid_until: value.valid_until,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniverseResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Universe> for UniverseResponse {
    fn from(value: Universe) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: Uuid,
    pub universe: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Resource> for ResourceResponse {
    fn from(value: Resource) -> Self {
        Self {
            id: value.id,
            universe: value.universe,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingCostResponse {
    pub resource: Uuid,
    pub cost: i32,
    pub progress: f64,
}

impl From<&BuildingCost> for BuildingCostResponse {
    fn from(value: &BuildingCost) -> Self {
        Self {
            resource: value.resource,
            cost: value.cost,
            progress: value.progress,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingProductionResponse {
    pub resource: Uuid,
    pub base: i32,
    pub progress: f64,
}

impl From<&BuildingResourceProduction> for BuildingProductionResponse {
    fn from(value: &BuildingResourceProduction) -> Self {
        Self {
            resource: value.resource,
            base: value.base,
            progress: value.progress,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingStorageResponse {
    pub resource: Uuid,
    pub base: i32,
    pub scale: f64,
    pub progress: f64,
}

impl From<&BuildingResourceStorage> for BuildingStorageResponse {
    fn from(value: &BuildingResourceStorage) -> Self {
        Self {
            resource: value.resource,
            base: value.base,
            scale: value.scale,
            progress: value.progress,
        }
    }
}

/// A building with its cost, production and storage rules.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullBuildingResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub costs: Vec<BuildingCostResponse>,
    pub productions: Vec<BuildingProductionResponse>,
    pub storages: Vec<BuildingStorageResponse>,
}

impl FullBuildingResponse {
    fn from_catalogue(building: &Building, catalogue: &Catalogue) -> Self {
        Self {
            id: building.id,
            name: building.name.clone(),
            created_at: building.created_at,
            costs: catalogue.costs_for(building.id).map(Into::into).collect(),
            productions: catalogue
                .productions_for(building.id)
                .map(Into::into)
                .collect(),
            storages: catalogue.storages_for(building.id).map(Into::into).collect(),
        }
    }
}

/// A universe together with its catalogue.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullUniverseResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub resources: Vec<ResourceResponse>,
    pub buildings: Vec<FullBuildingResponse>,
}

impl From<FullUniverse> for FullUniverseResponse {
    fn from(value: FullUniverse) -> Self {
        let FullUniverse {
            universe,
            catalogue,
        } = value;
        let buildings = catalogue
            .buildings
            .iter()
            .map(|building| FullBuildingResponse::from_catalogue(building, &catalogue))
            .collect();
        Self {
            id: universe.id,
            name: universe.name,
            created_at: universe.created_at,
            resources: catalogue.resources.into_iter().map(Into::into).collect(),
            buildings,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: Uuid,
    pub api_user: Uuid,
    pub universe: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Player> for PlayerResponse {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            api_user: value.api_user,
            universe: value.universe,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetResponse {
    pub id: Uuid,
    pub player: Uuid,
    pub name: String,
    pub homeworld: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Planet> for PlanetResponse {
    fn from(value: Planet) -> Self {
        Self {
            id: value.id,
            player: value.player,
            name: value.name,
            homeworld: value.homeworld,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetResourceResponse {
    pub planet: Uuid,
    pub resource: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanetResource> for PlanetResourceResponse {
    fn from(value: PlanetResource) -> Self {
        Self {
            planet: value.planet,
            resource: value.resource,
            amount: value.amount,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetProductionResponse {
    pub planet: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Uuid>,
    pub resource: Uuid,
    pub production: i32,
}

impl From<PlanetResourceProduction> for PlanetProductionResponse {
    fn from(value: PlanetResourceProduction) -> Self {
        Self {
            planet: value.planet,
            building: value.building,
            resource: value.resource,
            production: value.production,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetStorageResponse {
    pub planet: Uuid,
    pub resource: Uuid,
    pub storage: i32,
}

impl From<PlanetResourceStorage> for PlanetStorageResponse {
    fn from(value: PlanetResourceStorage) -> Self {
        Self {
            planet: value.planet,
            resource: value.resource,
            storage: value.storage,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanetBuildingResponse {
    pub planet: Uuid,
    pub building: Uuid,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanetBuilding> for PlanetBuildingResponse {
    fn from(value: PlanetBuilding) -> Self {
        Self {
            planet: value.planet,
            building: value.building,
            level: value.level,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingActionResponse {
    pub id: Uuid,
    pub planet: Uuid,
    pub building: Uuid,
    pub current_level: i32,
    pub desired_level: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl From<BuildingAction> for BuildingActionResponse {
    fn from(value: BuildingAction) -> Self {
        Self {
            id: value.id,
            planet: value.planet,
            building: value.building,
            current_level: value.current_level,
            desired_level: value.desired_level,
            created_at: value.created_at,
            completed_at: value.completed_at,
        }
    }
}

/// A planet with every row it owns, as of the request's catch-up.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullPlanetResponse {
    pub id: Uuid,
    pub player: Uuid,
    pub name: String,
    pub homeworld: bool,
    pub created_at: DateTime<Utc>,
    pub resources: Vec<PlanetResourceResponse>,
    pub productions: Vec<PlanetProductionResponse>,
    pub storages: Vec<PlanetStorageResponse>,
    pub buildings: Vec<PlanetBuildingResponse>,
    pub building_actions: Vec<BuildingActionResponse>,
}

impl From<FullPlanet> for FullPlanetResponse {
    fn from(value: FullPlanet) -> Self {
        Self {
            id: value.planet.id,
            player: value.planet.player,
            name: value.planet.name,
            homeworld: value.planet.homeworld,
            created_at: value.planet.created_at,
            resources: value.resources.into_iter().map(Into::into).collect(),
            productions: value.productions.into_iter().map(Into::into).collect(),
            storages: value.storages.into_iter().map(Into::into).collect(),
            buildings: value.buildings.into_iter().map(Into::into).collect(),
            building_actions: value
                .actions
                .into_iter()
                .map(|pending| pending.action.into())
                .collect(),
        }
    }
}
