//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts to and from its domain
//! entity field by field.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    acl_permissions, acls, api_keys, building_costs, building_resources_productions, building_resources_storages,
    buildings, buildings_actions, buildings_actions_costs,
    buildings_actions_resources_productions, buildings_actions_resources_storages, planets,
    planets_buildings, planets_resources, planets_resources_productions,
    planets_resources_storages, players, resources, universes, users,
};
use crate::domain::{ApiKey, PasswordHash, User};
use crate::domain::game::{
    Building, BuildingAction, BuildingActionCost, BuildingActionResourceProduction,
    BuildingActionResourceStorage, BuildingCost, BuildingResourceProduction,
    BuildingResourceStorage, Planet, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, Player, Resource, Universe,
};

/// Declare a row struct mirroring a domain entity and the conversions
/// between them.
macro_rules! mirrored_row {
    (
        $(#[$meta:meta])*
        $row:ident for $entity:ident in $table:ident {
            $($field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Queryable, Selectable, Insertable)]
        #[diesel(table_name = $table)]
        #[diesel(check_for_backend(diesel::pg::Pg))]
        pub(crate) struct $row {
            $(pub $field: $ty,)*
        }

        impl From<$row> for $entity {
            fn from(row: $row) -> Self {
                Self {
                    $($field: row.$field,)*
                }
            }
        }

        impl From<&$entity> for $row {
            fn from(entity: &$entity) -> Self {
                Self {
                    $($field: entity.$field.clone(),)*
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

mirrored_row! {
    UniverseRow for Universe in universes {
        id: Uuid,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

mirrored_row! {
    ResourceRow for Resource in resources {
        id: Uuid,
        universe: Uuid,
        name: String,
        start_amount: i32,
        start_production: i32,
        start_storage: i32,
        created_at: DateTime<Utc>,
    }
}

mirrored_row! {
    BuildingRow for Building in buildings {
        id: Uuid,
        universe: Uuid,
        name: String,
        created_at: DateTime<Utc>,
    }
}

mirrored_row! {
    BuildingCostRow for BuildingCost in building_costs {
        building: Uuid,
        resource: Uuid,
        cost: i32,
        progress: f64,
    }
}

mirrored_row! {
    BuildingProductionRow for BuildingResourceProduction in building_resources_productions {
        building: Uuid,
        resource: Uuid,
        base: i32,
        progress: f64,
    }
}

mirrored_row! {
    BuildingStorageRow for BuildingResourceStorage in building_resources_storages {
        building: Uuid,
        resource: Uuid,
        base: i32,
        scale: f64,
        progress: f64,
    }
}

// ---------------------------------------------------------------------------
// Players and planets
// ---------------------------------------------------------------------------

mirrored_row! {
    PlayerRow for Player in players {
        id: Uuid,
        api_user: Uuid,
        universe: Uuid,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

mirrored_row! {
    PlanetRow for Planet in planets {
        id: Uuid,
        player: Uuid,
        name: String,
        homeworld: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

mirrored_row! {
    PlanetResourceRow for PlanetResource in planets_resources {
        planet: Uuid,
        resource: Uuid,
        amount: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

mirrored_row! {
    PlanetStorageRow for PlanetResourceStorage in planets_resources_storages {
        planet: Uuid,
        resource: Uuid,
        storage: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

mirrored_row! {
    PlanetBuildingRow for PlanetBuilding in planets_buildings {
        planet: Uuid,
        building: Uuid,
        level: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i32,
    }
}

/// Production rows carry a surrogate key the domain never sees.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = planets_resources_productions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlanetProductionRow {
    pub id: Uuid,
    pub planet: Uuid,
    pub resource: Uuid,
    pub building: Option<Uuid>,
    pub production: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl From<PlanetProductionRow> for PlanetResourceProduction {
    fn from(row: PlanetProductionRow) -> Self {
        Self {
            planet: row.planet,
            building: row.building,
            resource: row.resource,
            production: row.production,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        }
    }
}

impl PlanetProductionRow {
    pub(crate) fn new_for(entity: &PlanetResourceProduction) -> Self {
        Self {
            id: Uuid::new_v4(),
            planet: entity.planet,
            resource: entity.resource,
            building: entity.building,
            production: entity.production,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            version: entity.version,
        }
    }
}

// ---------------------------------------------------------------------------
// Building actions
// ---------------------------------------------------------------------------

mirrored_row! {
    BuildingActionRow for BuildingAction in buildings_actions {
        id: Uuid,
        planet: Uuid,
        building: Uuid,
        current_level: i32,
        desired_level: i32,
        created_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    }
}

mirrored_row! {
    ActionCostRow for BuildingActionCost in buildings_actions_costs {
        action: Uuid,
        resource: Uuid,
        amount: i32,
    }
}

mirrored_row! {
    ActionProductionRow for BuildingActionResourceProduction in buildings_actions_resources_productions {
        action: Uuid,
        resource: Uuid,
        production: i32,
    }
}

mirrored_row! {
    ActionStorageRow for BuildingActionResourceStorage in buildings_actions_resources_storages {
        action: Uuid,
        resource: Uuid,
        storage: i32,
    }
}

mirrored_row! {
    ApiKeyRow for ApiKey in api_keys {
        id: Uuid,
        key: Uuid,
        api_user: Uuid,
        valid_until: DateTime<Utc>,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password: PasswordHash::from_stored(row.password),
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            password: user.password.as_str().to_owned(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            version: user.version,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = acls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AclRow {
    pub id: Uuid,
    pub api_user: Uuid,
    pub resource: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = acl_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AclPermissionRow {
    pub acl: Uuid,
    pub permission: String,
}

/// Server clock read at the start of a transaction.
#[derive(Debug, QueryableByName)]
pub(crate) struct NowRow {
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub now: DateTime<Utc>,
}
