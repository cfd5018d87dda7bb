//! Universes and their static catalogue of resources and buildings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Root container grouping players and a catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// A resource of a universe, with the values new planets start from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub universe: Uuid,
    pub name: String,
    pub start_amount: i32,
    pub start_production: i32,
    pub start_storage: i32,
    pub created_at: DateTime<Utc>,
}

/// A building planets can upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: Uuid,
    pub universe: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Cost law of a building for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCost {
    pub building: Uuid,
    pub resource: Uuid,
    pub cost: i32,
    pub progress: f64,
}

/// Production law of a building for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingResourceProduction {
    pub building: Uuid,
    pub resource: Uuid,
    pub base: i32,
    pub progress: f64,
}

/// Storage law of a building for one resource.
///
/// `scale` is stored but not used by the current law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingResourceStorage {
    pub building: Uuid,
    pub resource: Uuid,
    pub base: i32,
    pub scale: f64,
    pub progress: f64,
}

/// Static rows of one universe, loaded as a single view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub resources: Vec<Resource>,
    pub buildings: Vec<Building>,
    pub costs: Vec<BuildingCost>,
    pub productions: Vec<BuildingResourceProduction>,
    pub storages: Vec<BuildingResourceStorage>,
}

impl Catalogue {
    /// Look up a resource by its name.
    pub fn resource_by_name(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// Look up a building by id.
    pub fn building(&self, id: Uuid) -> Option<&Building> {
        self.buildings.iter().find(|building| building.id == id)
    }

    /// Look up a building by its name.
    pub fn building_by_name(&self, name: &str) -> Option<&Building> {
        self.buildings.iter().find(|building| building.name == name)
    }

    pub fn costs_for(&self, building: Uuid) -> impl Iterator<Item = &BuildingCost> {
        self.costs.iter().filter(move |row| row.building == building)
    }

    pub fn productions_for(
        &self,
        building: Uuid,
    ) -> impl Iterator<Item = &BuildingResourceProduction> {
        self.productions.iter().filter(move |row| row.building == building)
    }

    pub fn storages_for(&self, building: Uuid) -> impl Iterator<Item = &BuildingResourceStorage> {
        self.storages.iter().filter(move |row| row.building == building)
    }
}

/// A universe together with its catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct FullUniverse {
    pub universe: Universe,
    pub catalogue: Catalogue,
}
