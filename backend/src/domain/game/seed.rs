//! Standard catalogue seeded into every new universe.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalogue::{
    Building, BuildingCost, BuildingResourceProduction, BuildingResourceStorage, Catalogue,
    Resource,
};
use crate::domain::progression::{CRYSTAL, METAL};

/// Name of the third standard resource.
pub const DEUTERIUM: &str = "deuterium";

struct ResourceSeed {
    name: &'static str,
    start_amount: i32,
    start_production: i32,
    start_storage: i32,
}

struct BuildingSeed {
    name: &'static str,
    costs: &'static [(&'static str, i32, f64)],
    production: Option<(&'static str, i32, f64)>,
    storage: Option<(&'static str, i32, f64)>,
}

const RESOURCES: &[ResourceSeed] = &[
    ResourceSeed {
        name: METAL,
        start_amount: 500,
        start_production: 30,
        start_storage: 10_000,
    },
    ResourceSeed {
        name: CRYSTAL,
        start_amount: 500,
        start_production: 15,
        start_storage: 10_000,
    },
    ResourceSeed {
        name: DEUTERIUM,
        start_amount: 0,
        start_production: 0,
        start_storage: 10_000,
    },
];

const BUILDINGS: &[BuildingSeed] = &[
    BuildingSeed {
        name: "metal mine",
        costs: &[(METAL, 60, 1.5), (CRYSTAL, 15, 1.5)],
        production: Some((METAL, 30, 1.1)),
        storage: None,
    },
    BuildingSeed {
        name: "crystal mine",
        costs: &[(METAL, 48, 1.6), (CRYSTAL, 24, 1.6)],
        production: Some((CRYSTAL, 20, 1.1)),
        storage: None,
    },
    BuildingSeed {
        name: "deuterium synthesizer",
        costs: &[(METAL, 225, 1.5), (CRYSTAL, 75, 1.5)],
        production: Some((DEUTERIUM, 10, 1.1)),
        storage: None,
    },
    BuildingSeed {
        name: "metal storage",
        costs: &[(METAL, 1000, 2.0)],
        production: None,
        storage: Some((METAL, 20_000, 2.0)),
    },
    BuildingSeed {
        name: "crystal storage",
        costs: &[(METAL, 1000, 2.0), (CRYSTAL, 500, 2.0)],
        production: None,
        storage: Some((CRYSTAL, 20_000, 2.0)),
    },
    BuildingSeed {
        name: "deuterium tank",
        costs: &[(METAL, 1000, 2.0), (CRYSTAL, 1000, 2.0)],
        production: None,
        storage: Some((DEUTERIUM, 20_000, 2.0)),
    },
];

/// Build the standard catalogue for `universe` with fresh identifiers.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use stellar_backend::domain::game::standard_catalogue;
/// use uuid::Uuid;
///
/// let catalogue = standard_catalogue(Uuid::new_v4(), Utc::now());
/// assert!(catalogue.resource_by_name("metal").is_some());
/// assert_eq!(catalogue.buildings.len(), 6);
/// ```
pub fn standard_catalogue(universe: Uuid, now: DateTime<Utc>) -> Catalogue {
    let resources: Vec<Resource> = RESOURCES
        .iter()
        .map(|seed| Resource {
            id: Uuid::new_v4(),
            universe,
            name: seed.name.to_owned(),
            start_amount: seed.start_amount,
            start_production: seed.start_production,
            start_storage: seed.start_storage,
            created_at: now,
        })
        .collect();
    let resource_id = |name: &str| {
        resources
            .iter()
            .find(|resource| resource.name == name)
            .map(|resource| resource.id)
    };

    let mut catalogue = Catalogue::default();
    for seed in BUILDINGS {
        let building = Building {
            id: Uuid::new_v4(),
            universe,
            name: seed.name.to_owned(),
            created_at: now,
        };

        for &(name, cost, progress) in seed.costs {
            if let Some(resource) = resource_id(name) {
                catalogue.costs.push(BuildingCost {
                    building: building.id,
                    resource,
                    cost,
                    progress,
                });
            }
        }
        if let Some((name, base, progress)) = seed.production
            && let Some(resource) = resource_id(name)
        {
            catalogue.productions.push(BuildingResourceProduction {
                building: building.id,
                resource,
                base,
                progress,
            });
        }
        if let Some((name, base, progress)) = seed.storage
            && let Some(resource) = resource_id(name)
        {
            catalogue.storages.push(BuildingResourceStorage {
                building: building.id,
                resource,
                base,
                scale: 1.0,
                progress,
            });
        }

        catalogue.buildings.push(building);
    }

    catalogue.resources = resources;
    catalogue
}
