//! Planets and the rows they exclusively own.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::action::PendingAction;
use super::catalogue::Catalogue;

/// A planet owned by a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub id: Uuid,
    pub player: Uuid,
    pub name: String,
    pub homeworld: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Stockpile of one resource on a planet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetResource {
    pub planet: Uuid,
    pub resource: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Hourly production of one resource, either the base row (`building` is
/// `None`) or the contribution of one building.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetResourceProduction {
    pub planet: Uuid,
    pub building: Option<Uuid>,
    pub resource: Uuid,
    pub production: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Effective storage cap of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetResourceStorage {
    pub planet: Uuid,
    pub resource: Uuid,
    pub storage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Level of one building on a planet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetBuilding {
    pub planet: Uuid,
    pub building: Uuid,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Write intent for a versioned row.
///
/// `Update` carries the version read in the current transaction; stores
/// reject it when the row moved on since.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<T> {
    Insert(T),
    Update(T),
}

impl<T> Upsert<T> {
    /// The row being written.
    pub fn row(&self) -> &T {
        match self {
            Self::Insert(row) | Self::Update(row) => row,
        }
    }
}

/// Rows created together with a planet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanetRows {
    pub resources: Vec<PlanetResource>,
    pub productions: Vec<PlanetResourceProduction>,
    pub storages: Vec<PlanetResourceStorage>,
    pub buildings: Vec<PlanetBuilding>,
}

impl PlanetRows {
    /// Starting rows of `planet` from the catalogue's start values: one
    /// stockpile, one base production and one storage per resource, and
    /// every building at level 0.
    pub fn initial(planet: Uuid, catalogue: &Catalogue, now: DateTime<Utc>) -> Self {
        let mut rows = Self::default();
        for resource in &catalogue.resources {
            rows.resources.push(PlanetResource {
                planet,
                resource: resource.id,
                amount: f64::from(resource.start_amount),
                created_at: now,
                updated_at: now,
                version: 0,
            });
            rows.productions.push(PlanetResourceProduction {
                planet,
                building: None,
                resource: resource.id,
                production: resource.start_production,
                created_at: now,
                updated_at: now,
                version: 0,
            });
            rows.storages.push(PlanetResourceStorage {
                planet,
                resource: resource.id,
                storage: resource.start_storage,
                created_at: now,
                updated_at: now,
                version: 0,
            });
        }
        rows.buildings = catalogue
            .buildings
            .iter()
            .map(|building| PlanetBuilding {
                planet,
                building: building.id,
                level: 0,
                created_at: now,
                updated_at: now,
                version: 0,
            })
            .collect();
        rows
    }
}

/// Everything known about a planet inside one store transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSnapshot {
    pub planet: Planet,
    pub universe: Uuid,
    pub resources: Vec<PlanetResource>,
    pub productions: Vec<PlanetResourceProduction>,
    pub storages: Vec<PlanetResourceStorage>,
    pub buildings: Vec<PlanetBuilding>,
    pub actions: Vec<PendingAction>,
    pub catalogue: Catalogue,
}

impl PlanetSnapshot {
    /// Sum of all production rows of `resource`.
    pub fn aggregated_production(&self, resource: Uuid) -> i64 {
        self.productions
            .iter()
            .filter(|row| row.resource == resource)
            .map(|row| i64::from(row.production))
            .sum()
    }

    /// Storage cap of `resource`; a resource without storage row holds
    /// nothing more than it already has.
    pub fn storage_cap(&self, resource: Uuid) -> i32 {
        self.storages
            .iter()
            .find(|row| row.resource == resource)
            .map_or(0, |row| row.storage)
    }

    /// Current level of `building`, 0 when the planet never built it.
    pub fn building_level(&self, building: Uuid) -> i32 {
        self.buildings
            .iter()
            .find(|row| row.building == building)
            .map_or(0, |row| row.level)
    }

    pub fn resource(&self, resource: Uuid) -> Option<&PlanetResource> {
        self.resources.iter().find(|row| row.resource == resource)
    }

    pub fn resource_mut(&mut self, resource: Uuid) -> Option<&mut PlanetResource> {
        self.resources.iter_mut().find(|row| row.resource == resource)
    }

    /// The in-flight action on `building`, if any.
    pub fn action_for(&self, building: Uuid) -> Option<&PendingAction> {
        self.actions
            .iter()
            .find(|pending| pending.action.building == building)
    }
}

/// Planet as presented to clients, with every owned row.
#[derive(Debug, Clone, PartialEq)]
pub struct FullPlanet {
    pub planet: Planet,
    pub resources: Vec<PlanetResource>,
    pub productions: Vec<PlanetResourceProduction>,
    pub storages: Vec<PlanetResourceStorage>,
    pub buildings: Vec<PlanetBuilding>,
    pub actions: Vec<PendingAction>,
}

impl From<PlanetSnapshot> for FullPlanet {
    fn from(snapshot: PlanetSnapshot) -> Self {
        Self {
            planet: snapshot.planet,
            resources: snapshot.resources,
            productions: snapshot.productions,
            storages: snapshot.storages,
            buildings: snapshot.buildings,
            actions: snapshot.actions,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for planet rows.
    use super::*;
    use crate::domain::game::standard_catalogue;
    use rstest::rstest;

    #[rstest]
    fn initial_rows_follow_start_values() {
        let now = Utc::now();
        let catalogue = standard_catalogue(Uuid::new_v4(), now);
        let planet = Uuid::new_v4();
        let rows = PlanetRows::initial(planet, &catalogue, now);

        assert_eq!(rows.resources.len(), catalogue.resources.len());
        assert_eq!(rows.buildings.len(), catalogue.buildings.len());
        assert!(rows.buildings.iter().all(|row| row.level == 0));
        assert!(rows.productions.iter().all(|row| row.building.is_none()));

        let metal = catalogue.resource_by_name("metal").expect("metal seeded");
        let stockpile = rows
            .resources
            .iter()
            .find(|row| row.resource == metal.id)
            .expect("metal stockpile");
        assert_eq!(stockpile.amount, f64::from(metal.start_amount));
    }
}
