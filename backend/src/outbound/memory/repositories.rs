//! Repository ports over the in-memory state.

use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{Acl, ApiKey, Limit, User};
use crate::domain::game::{
    Catalogue, FullUniverse, Planet, PlanetRows, Player, Resource, Universe,
};
use crate::domain::ports::{
    ApiKeyRepository, ApiKeyRepositoryError, AuthorizationRepository,
    AuthorizationRepositoryError, PlanetRepository, PlanetRepositoryError, PlayerRepository,
    PlayerRepositoryError, UniverseRepository, UniverseRepositoryError, UserRepository,
    UserRepositoryError,
};

#[async_trait]
impl UniverseRepository for MemoryStore {
    async fn create(
        &self,
        universe: &Universe,
        catalogue: &Catalogue,
    ) -> Result<(), UniverseRepositoryError> {
        let mut state = self.state.lock().await;
        if state
            .universes
            .values()
            .any(|existing| existing.name == universe.name)
        {
            return Err(UniverseRepositoryError::name_taken(universe.name.clone()));
        }
        state.universes.insert(universe.id, universe.clone());
        state.catalogues.insert(universe.id, catalogue.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Universe>, UniverseRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.universes.values().cloned().collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<FullUniverse>, UniverseRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.universes.get(&id).map(|universe| FullUniverse {
            universe: universe.clone(),
            catalogue: state.catalogues.get(&id).cloned().unwrap_or_default(),
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UniverseRepositoryError> {
        Ok(self.state.lock().await.remove_universe(id))
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, UniverseRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .catalogues
            .values()
            .flat_map(|catalogue| catalogue.resources.iter().cloned())
            .collect())
    }

    async fn find_resource(&self, id: Uuid) -> Result<Option<Resource>, UniverseRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .catalogues
            .values()
            .flat_map(|catalogue| catalogue.resources.iter())
            .find(|resource| resource.id == id)
            .cloned())
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn create(
        &self,
        player: &Player,
        homeworld: &Planet,
        rows: &PlanetRows,
    ) -> Result<(), PlayerRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.universes.contains_key(&player.universe) {
            return Err(PlayerRepositoryError::no_such_universe(player.universe));
        }
        if state
            .players
            .values()
            .any(|existing| existing.universe == player.universe && existing.name == player.name)
        {
            return Err(PlayerRepositoryError::name_taken(player.name.clone()));
        }
        state.players.insert(player.id, player.clone());
        state.insert_planet(homeworld, rows);
        Ok(())
    }

    async fn list(&self, api_user: Option<Uuid>) -> Result<Vec<Player>, PlayerRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .players
            .values()
            .filter(|player| api_user.is_none_or(|user| player.api_user == user))
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Player>, PlayerRepositoryError> {
        Ok(self.state.lock().await.players.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PlayerRepositoryError> {
        Ok(self.state.lock().await.remove_player(id))
    }
}

#[async_trait]
impl PlanetRepository for MemoryStore {
    async fn create(&self, planet: &Planet, rows: &PlanetRows) -> Result<(), PlanetRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.players.contains_key(&planet.player) {
            return Err(PlanetRepositoryError::no_such_player(planet.player));
        }
        state.insert_planet(planet, rows);
        Ok(())
    }

    async fn list(&self, player: Option<Uuid>) -> Result<Vec<Planet>, PlanetRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .planets
            .values()
            .filter(|planet| player.is_none_or(|owner| planet.player == owner))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PlanetRepositoryError> {
        Ok(self.state.lock().await.remove_planet(id))
    }
}

#[async_trait]
impl ApiKeyRepository for MemoryStore {
    async fn find_by_key(&self, key: Uuid) -> Result<Option<ApiKey>, ApiKeyRepositoryError> {
        Ok(self.state.lock().await.api_keys.get(&key).cloned())
    }

    async fn create(&self, key: &ApiKey) -> Result<(), ApiKeyRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&key.api_user) {
            return Err(ApiKeyRepositoryError::no_such_user(key.api_user));
        }
        state.api_keys.insert(key.key, key.clone());
        Ok(())
    }

    async fn delete_for_user(&self, user: Uuid) -> Result<usize, ApiKeyRepositoryError> {
        let mut state = self.state.lock().await;
        let before = state.api_keys.len();
        state.api_keys.retain(|_, key| key.api_user != user);
        Ok(before - state.api_keys.len())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::email_taken(user.email.clone()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>, UserRepositoryError> {
        let state = self.state.lock().await;
        let mut users: Vec<&User> = state.users.values().collect();
        users.sort_by_key(|user| (user.created_at, user.id));
        Ok(users.into_iter().map(|user| user.id).collect())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(UserRepositoryError::email_taken(user.email.clone()));
        }
        match state.users.get_mut(&user.id) {
            Some(stored) if stored.version + 1 == user.version => {
                *stored = user.clone();
                Ok(())
            }
            _ => Err(UserRepositoryError::optimistic_lock(user.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserRepositoryError> {
        Ok(self.state.lock().await.remove_user(id))
    }
}

#[async_trait]
impl AuthorizationRepository for MemoryStore {
    async fn acls_for_user(&self, user: Uuid) -> Result<Vec<Acl>, AuthorizationRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.acls.iter().filter(|acl| acl.user == user).cloned().collect())
    }

    async fn limits_for_user(
        &self,
        user: Uuid,
    ) -> Result<Vec<Limit>, AuthorizationRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .limits
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, limit)| limit.clone())
            .collect())
    }
}
