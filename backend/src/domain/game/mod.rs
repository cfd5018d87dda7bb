//! Game entities: the universe catalogue, players, planets and building
//! actions.

mod action;
mod catalogue;
mod error;
mod planet;
mod player;
mod seed;

pub use action::{
    BuildingAction, BuildingActionCost, BuildingActionResourceProduction,
    BuildingActionResourceStorage, PendingAction, credit_costs, debit_costs, derive_action,
    validate_action,
};
pub use catalogue::{
    Building, BuildingCost, BuildingResourceProduction, BuildingResourceStorage, Catalogue,
    FullUniverse, Resource, Universe,
};
pub use error::GameError;
pub use planet::{
    FullPlanet, Planet, PlanetBuilding, PlanetResource, PlanetResourceProduction,
    PlanetResourceStorage, PlanetRows, PlanetSnapshot, Upsert,
};
pub use player::Player;
pub use seed::{DEUTERIUM, standard_catalogue};
