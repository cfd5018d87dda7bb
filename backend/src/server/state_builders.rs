//! Assemble [`HttpState`] from a store and its repositories.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;

use crate::domain::ports::{
    ApiKeyRepository, AuthorizationRepository, GameStore, PlanetRepository, PlayerRepository,
    UniverseRepository, UserRepository,
};
use crate::domain::{
    ApiKeyService, AuthorizationService, BuildingActionService, CatchUpService,
    PlanetCommandService, PlanetGate, PlanetQueryService, PlayerService, StoreHealthProbe,
    UniverseService, UserService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselApiKeyRepository, DieselAuthorizationRepository, DieselGameStore,
    DieselPlanetRepository, DieselPlayerRepository, DieselUniverseRepository,
    DieselUserRepository,
};

/// Adapters backing every port of the HTTP state.
pub struct StoreAdapters<S, U, P, Q, K, W, A> {
    pub store: Arc<S>,
    pub universes: Arc<U>,
    pub players: Arc<P>,
    pub planets: Arc<Q>,
    pub keys: Arc<K>,
    pub users: Arc<W>,
    pub authorizations: Arc<A>,
}

/// Wire domain services over `adapters`, sharing one `gate`. Keys issued at
/// login stay valid for `key_validity`.
pub fn build_http_state<S, U, P, Q, K, W, A>(
    adapters: StoreAdapters<S, U, P, Q, K, W, A>,
    gate: Arc<PlanetGate>,
    clock: Arc<dyn Clock>,
    key_validity: TimeDelta,
) -> HttpState
where
    S: GameStore + 'static,
    U: UniverseRepository + 'static,
    P: PlayerRepository + 'static,
    Q: PlanetRepository + 'static,
    K: ApiKeyRepository + 'static,
    W: UserRepository + 'static,
    A: AuthorizationRepository + 'static,
{
    let StoreAdapters {
        store,
        universes,
        players,
        planets,
        keys,
        users,
        authorizations,
    } = adapters;
    let universe_service = Arc::new(UniverseService::new(Arc::clone(&universes), Arc::clone(&clock)));
    let player_service = Arc::new(PlayerService::new(
        Arc::clone(&players),
        Arc::clone(&universes),
        Arc::clone(&clock),
    ));
    let user_service = Arc::new(
        UserService::new(users, Arc::clone(&keys), Arc::clone(&clock))
            .with_key_validity(key_validity),
    );
    HttpState {
        universes: universe_service.clone(),
        universes_query: universe_service,
        players: player_service.clone(),
        players_query: player_service,
        planets: Arc::new(PlanetCommandService::new(
            Arc::clone(&planets),
            players,
            universes,
            Arc::clone(&clock),
        )),
        planets_query: Arc::new(PlanetQueryService::new(Arc::clone(&store), planets)),
        actions: Arc::new(BuildingActionService::new(
            Arc::clone(&store),
            Arc::clone(&gate),
            Arc::clone(&clock),
        )),
        catch_up: Arc::new(CatchUpService::new(Arc::clone(&store), gate)),
        users: user_service.clone(),
        users_query: user_service,
        authorizer: Arc::new(AuthorizationService::new(
            Arc::clone(&keys),
            authorizations,
            Arc::clone(&clock),
        )),
        authenticator: Arc::new(ApiKeyService::new(keys, Arc::clone(&clock))),
        health: Arc::new(StoreHealthProbe::new(store)),
        clock,
    }
}

/// State backed by the in-memory store; the store is returned so callers
/// can seed ACLs and limits.
pub fn build_memory_state(
    gate: Arc<PlanetGate>,
    clock: Arc<dyn Clock>,
    key_validity: TimeDelta,
) -> (HttpState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(Arc::clone(&clock)));
    let adapters = StoreAdapters {
        store: Arc::clone(&store),
        universes: Arc::clone(&store),
        players: Arc::clone(&store),
        planets: Arc::clone(&store),
        keys: Arc::clone(&store),
        users: Arc::clone(&store),
        authorizations: Arc::clone(&store),
    };
    (build_http_state(adapters, gate, clock, key_validity), store)
}

/// State backed by PostgreSQL through `pool`.
pub fn build_diesel_state(
    pool: DbPool,
    gate: Arc<PlanetGate>,
    clock: Arc<dyn Clock>,
    key_validity: TimeDelta,
) -> HttpState {
    let adapters = StoreAdapters {
        store: Arc::new(DieselGameStore::new(pool.clone())),
        universes: Arc::new(DieselUniverseRepository::new(pool.clone())),
        players: Arc::new(DieselPlayerRepository::new(pool.clone())),
        planets: Arc::new(DieselPlanetRepository::new(pool.clone())),
        keys: Arc::new(DieselApiKeyRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        authorizations: Arc::new(DieselAuthorizationRepository::new(pool)),
    };
    build_http_state(adapters, gate, clock, key_validity)
}
