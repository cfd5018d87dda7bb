//! User accounts, sessions and key authorization.
//!
//! A session is an [`ApiKey`] valid for a fixed period after login. Logging
//! out revokes every key of the user at once.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::auth::map_api_key_error;
use crate::domain::ports::{
    ApiKeyRepository, AuthorizationRepository, AuthorizationRepositoryError, Authorizer,
    UserCommand, UserQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{ApiKey, Authorization, Credentials, Error, PasswordHash, User};

/// Lifetime of keys issued when no other is configured.
pub const DEFAULT_KEY_VALIDITY: TimeDelta = TimeDelta::hours(1);

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::EmailTaken { .. } => Error::conflict("Email already used"),
        UserRepositoryError::OptimisticLock { .. } => Error::conflict("User is not up to date"),
    }
}

fn map_authorization_error(error: AuthorizationRepositoryError) -> Error {
    match error {
        AuthorizationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("authorization repository unavailable: {message}"))
        }
        AuthorizationRepositoryError::Query { message } => {
            Error::internal(format!("authorization repository error: {message}"))
        }
    }
}

fn no_such_user() -> Error {
    Error::not_found("No such user")
}

/// Service implementing the user driving ports.
#[derive(Clone)]
pub struct UserService<U, K> {
    users: Arc<U>,
    keys: Arc<K>,
    clock: Arc<dyn Clock>,
    key_validity: TimeDelta,
}

impl<U, K> UserService<U, K> {
    pub fn new(users: Arc<U>, keys: Arc<K>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            keys,
            clock,
            key_validity: DEFAULT_KEY_VALIDITY,
        }
    }

    /// Issue keys valid for `validity` instead of [`DEFAULT_KEY_VALIDITY`].
    pub fn with_key_validity(mut self, validity: TimeDelta) -> Self {
        self.key_validity = validity;
        self
    }
}

impl<U, K> UserService<U, K>
where
    U: UserRepository,
    K: ApiKeyRepository,
{
    async fn existing(&self, id: Uuid) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(no_such_user)
    }

    async fn issue_key(&self, user: &User) -> Result<ApiKey, Error> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            key: Uuid::new_v4(),
            api_user: user.id,
            valid_until: self.clock.utc() + self.key_validity,
        };
        self.keys.create(&key).await.map_err(map_api_key_error)?;
        info!(user = %user.id, valid_until = %key.valid_until, "api key issued");
        Ok(key)
    }
}

#[async_trait]
impl<U, K> UserCommand for UserService<U, K>
where
    U: UserRepository,
    K: ApiKeyRepository,
{
    async fn create_user(&self, credentials: Credentials) -> Result<User, Error> {
        let now = self.clock.utc();
        let user = User {
            id: Uuid::new_v4(),
            email: credentials.email().to_owned(),
            password: PasswordHash::new(credentials.password()),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        self.users.create(&user).await.map_err(map_user_error)?;
        info!(user = %user.id, "user created");
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, credentials: Credentials) -> Result<User, Error> {
        let current = self.existing(id).await?;
        let updated = User {
            email: credentials.email().to_owned(),
            password: PasswordHash::new(credentials.password()),
            updated_at: self.clock.utc(),
            version: current.version + 1,
            ..current
        };
        self.users.update(&updated).await.map_err(map_user_error)?;
        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), Error> {
        if self.users.delete(id).await.map_err(map_user_error)? {
            info!(user = %id, "user deleted");
            Ok(())
        } else {
            Err(no_such_user())
        }
    }

    async fn login(&self, credentials: Credentials) -> Result<ApiKey, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(no_such_user)?;
        if !user.password.verify(credentials.password()) {
            return Err(Error::unauthorized("Invalid credentials"));
        }
        self.issue_key(&user).await
    }

    async fn login_by_id(&self, id: Uuid) -> Result<ApiKey, Error> {
        let user = self.existing(id).await?;
        self.issue_key(&user).await
    }

    async fn logout(&self, id: Uuid) -> Result<(), Error> {
        self.existing(id).await?;
        let revoked = self
            .keys
            .delete_for_user(id)
            .await
            .map_err(map_api_key_error)?;
        info!(user = %id, revoked, "user logged out");
        Ok(())
    }
}

#[async_trait]
impl<U, K> UserQuery for UserService<U, K>
where
    U: UserRepository,
    K: ApiKeyRepository,
{
    async fn list_user_ids(&self) -> Result<Vec<Uuid>, Error> {
        self.users.list_ids().await.map_err(map_user_error)
    }

    async fn find_user(&self, id: Uuid) -> Result<User, Error> {
        self.existing(id).await
    }
}

/// Resolves a key to its owner's ACLs and limits.
#[derive(Clone)]
pub struct AuthorizationService<K, A> {
    keys: Arc<K>,
    authorizations: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<K, A> AuthorizationService<K, A> {
    pub fn new(keys: Arc<K>, authorizations: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            authorizations,
            clock,
        }
    }
}

#[async_trait]
impl<K, A> Authorizer for AuthorizationService<K, A>
where
    K: ApiKeyRepository,
    A: AuthorizationRepository,
{
    async fn authorize(&self, key: Uuid) -> Result<Authorization, Error> {
        let found = self
            .keys
            .find_by_key(key)
            .await
            .map_err(map_api_key_error)?
            .ok_or_else(|| Error::forbidden("User not authenticated"))?;
        if !found.is_valid_at(self.clock.utc()) {
            return Err(Error::forbidden("Authentication expired"));
        }
        let acls = self
            .authorizations
            .acls_for_user(found.api_user)
            .await
            .map_err(map_authorization_error)?;
        let limits = self
            .authorizations
            .limits_for_user(found.api_user)
            .await
            .map_err(map_authorization_error)?;
        Ok(Authorization { acls, limits })
    }
}
