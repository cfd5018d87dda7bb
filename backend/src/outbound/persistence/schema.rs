//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    universes (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    resources (id) {
        id -> Uuid,
        universe -> Uuid,
        name -> Varchar,
        start_amount -> Int4,
        start_production -> Int4,
        start_storage -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    buildings (id) {
        id -> Uuid,
        universe -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    building_costs (building, resource) {
        building -> Uuid,
        resource -> Uuid,
        cost -> Int4,
        progress -> Float8,
    }
}

diesel::table! {
    building_resources_productions (building, resource) {
        building -> Uuid,
        resource -> Uuid,
        base -> Int4,
        progress -> Float8,
    }
}

diesel::table! {
    building_resources_storages (building, resource) {
        building -> Uuid,
        resource -> Uuid,
        base -> Int4,
        scale -> Float8,
        progress -> Float8,
    }
}

diesel::table! {
    players (id) {
        id -> Uuid,
        api_user -> Uuid,
        universe -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    planets (id) {
        id -> Uuid,
        player -> Uuid,
        name -> Varchar,
        homeworld -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    /// Stockpiles; `updated_at` is the instant `amount` was last integrated to.
    planets_resources (planet, resource) {
        planet -> Uuid,
        resource -> Uuid,
        amount -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    /// One row per (planet, resource, building); a null building is the base
    /// production.
    planets_resources_productions (id) {
        id -> Uuid,
        planet -> Uuid,
        resource -> Uuid,
        building -> Nullable<Uuid>,
        production -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    planets_resources_storages (planet, resource) {
        planet -> Uuid,
        resource -> Uuid,
        storage -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    planets_buildings (planet, building) {
        planet -> Uuid,
        building -> Uuid,
        level -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    buildings_actions (id) {
        id -> Uuid,
        planet -> Uuid,
        building -> Uuid,
        current_level -> Int4,
        desired_level -> Int4,
        created_at -> Timestamptz,
        completed_at -> Timestamptz,
    }
}

diesel::table! {
    buildings_actions_costs (action, resource) {
        action -> Uuid,
        resource -> Uuid,
        amount -> Int4,
    }
}

diesel::table! {
    buildings_actions_resources_productions (action, resource) {
        action -> Uuid,
        resource -> Uuid,
        production -> Int4,
    }
}

diesel::table! {
    buildings_actions_resources_storages (action, resource) {
        action -> Uuid,
        resource -> Uuid,
        storage -> Int4,
    }
}

diesel::table! {
    api_keys (id) {
        id -> Uuid,
        key -> Uuid,
        api_user -> Uuid,
        valid_until -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Text,
        password -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        version -> Int4,
    }
}

diesel::table! {
    acls (id) {
        id -> Uuid,
        api_user -> Uuid,
        resource -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    acl_permissions (acl, permission) {
        acl -> Uuid,
        permission -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_limits (id) {
        id -> Uuid,
        name -> Text,
        api_user -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    limits (id) {
        id -> Uuid,
        name -> Text,
        value -> Text,
        user_limit -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(resources -> universes (universe));
diesel::joinable!(buildings -> universes (universe));
diesel::joinable!(players -> universes (universe));
diesel::joinable!(planets -> players (player));
diesel::joinable!(planets_resources -> planets (planet));
diesel::joinable!(planets_resources_productions -> planets (planet));
diesel::joinable!(planets_resources_storages -> planets (planet));
diesel::joinable!(planets_buildings -> planets (planet));
diesel::joinable!(buildings_actions -> planets (planet));
diesel::joinable!(buildings_actions_costs -> buildings_actions (action));
diesel::joinable!(buildings_actions_resources_productions -> buildings_actions (action));
diesel::joinable!(buildings_actions_resources_storages -> buildings_actions (action));
diesel::joinable!(api_keys -> users (api_user));
diesel::joinable!(acls -> users (api_user));
diesel::joinable!(acl_permissions -> acls (acl));
diesel::joinable!(user_limits -> users (api_user));
diesel::joinable!(limits -> user_limits (user_limit));

diesel::allow_tables_to_appear_in_same_query!(
    universes,
    resources,
    buildings,
    building_costs,
    building_resources_productions,
    building_resources_storages,
    players,
    planets,
    planets_resources,
    planets_resources_productions,
    planets_resources_storages,
    planets_buildings,
    buildings_actions,
    buildings_actions_costs,
    buildings_actions_resources_productions,
    buildings_actions_resources_storages,
    api_keys,
    users,
    acls,
    acl_permissions,
    user_limits,
    limits,
);
