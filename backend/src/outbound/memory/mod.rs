//! In-memory adapters for every persistence port.
//!
//! One [`MemoryStore`] holds the whole game state behind a single async
//! mutex. A [`GameTransaction`](crate::domain::ports::GameTransaction) keeps
//! that mutex for its whole lifetime and works on a copy of the state that
//! is written back on commit, so transactions are fully serialised. It backs
//! dev mode (no database configured) and the integration tests.

mod repositories;
mod transaction;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Acl, ApiKey, Limit, User};
use crate::domain::game::{
    Catalogue, GameError, PendingAction, Planet, PlanetBuilding, PlanetResource,
    PlanetResourceProduction, PlanetResourceStorage, PlanetRows, Player, Universe,
};
use crate::domain::ports::{GameStore, GameTransaction};

pub use transaction::MemoryTransaction;

type ProductionKey = (Uuid, Uuid, Option<Uuid>);

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    universes: BTreeMap<Uuid, Universe>,
    catalogues: BTreeMap<Uuid, Catalogue>,
    players: BTreeMap<Uuid, Player>,
    planets: BTreeMap<Uuid, Planet>,
    resources: BTreeMap<(Uuid, Uuid), PlanetResource>,
    productions: BTreeMap<ProductionKey, PlanetResourceProduction>,
    storages: BTreeMap<(Uuid, Uuid), PlanetResourceStorage>,
    buildings: BTreeMap<(Uuid, Uuid), PlanetBuilding>,
    actions: BTreeMap<Uuid, PendingAction>,
    api_keys: BTreeMap<Uuid, ApiKey>,
    users: BTreeMap<Uuid, User>,
    acls: Vec<Acl>,
    limits: Vec<(Uuid, Limit)>,
}

impl MemoryState {
    fn insert_planet(&mut self, planet: &Planet, rows: &PlanetRows) {
        self.planets.insert(planet.id, planet.clone());
        for row in &rows.resources {
            self.resources
                .insert((row.planet, row.resource), row.clone());
        }
        for row in &rows.productions {
            self.productions
                .insert((row.planet, row.resource, row.building), row.clone());
        }
        for row in &rows.storages {
            self.storages
                .insert((row.planet, row.resource), row.clone());
        }
        for row in &rows.buildings {
            self.buildings
                .insert((row.planet, row.building), row.clone());
        }
    }

    fn remove_planet(&mut self, planet: Uuid) -> bool {
        let existed = self.planets.remove(&planet).is_some();
        self.resources.retain(|_, row| row.planet != planet);
        self.productions.retain(|_, row| row.planet != planet);
        self.storages.retain(|_, row| row.planet != planet);
        self.buildings.retain(|_, row| row.planet != planet);
        self.actions
            .retain(|_, pending| pending.action.planet != planet);
        existed
    }

    fn remove_player(&mut self, player: Uuid) -> bool {
        let planets: Vec<Uuid> = self
            .planets
            .values()
            .filter(|planet| planet.player == player)
            .map(|planet| planet.id)
            .collect();
        for planet in planets {
            self.remove_planet(planet);
        }
        self.players.remove(&player).is_some()
    }

    fn remove_user(&mut self, user: Uuid) -> bool {
        self.api_keys.retain(|_, key| key.api_user != user);
        self.acls.retain(|acl| acl.user != user);
        self.limits.retain(|(owner, _)| *owner != user);
        self.users.remove(&user).is_some()
    }

    fn remove_universe(&mut self, universe: Uuid) -> bool {
        let players: Vec<Uuid> = self
            .players
            .values()
            .filter(|player| player.universe == universe)
            .map(|player| player.id)
            .collect();
        for player in players {
            self.remove_player(player);
        }
        self.catalogues.remove(&universe);
        self.universes.remove(&universe).is_some()
    }
}

/// Process-local store implementing the game and repository ports.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store; transactions take their timestamp from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            clock,
        }
    }

    /// Register an API key without going through a login.
    pub async fn insert_api_key(&self, key: ApiKey) {
        self.state.lock().await.api_keys.insert(key.key, key);
    }

    /// Grant an ACL to its user.
    pub async fn insert_acl(&self, acl: Acl) {
        self.state.lock().await.acls.push(acl);
    }

    /// Attach a limit to `user`.
    pub async fn insert_user_limit(&self, user: Uuid, limit: Limit) {
        self.state.lock().await.limits.push((user, limit));
    }

    /// Number of pending actions across all planets.
    pub async fn action_count(&self) -> usize {
        self.state.lock().await.actions.len()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn GameTransaction>, GameError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryTransaction::new(guard, self.clock.utc())))
    }

    async fn ping(&self) -> Result<(), GameError> {
        Ok(())
    }
}
