//! Driving ports for users, sessions and key authorization.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ApiKey, Authorization, Credentials, Error, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a user. A taken email is a conflict.
    async fn create_user(&self, credentials: Credentials) -> Result<User, Error>;

    /// Replace the email and password of an existing user.
    async fn update_user(&self, id: Uuid, credentials: Credentials) -> Result<User, Error>;

    /// Delete a user together with its keys, ACLs and limits.
    async fn delete_user(&self, id: Uuid) -> Result<(), Error>;

    /// Issue a key for the user matching `credentials`.
    async fn login(&self, credentials: Credentials) -> Result<ApiKey, Error>;

    /// Issue a key for a known user without checking a password.
    async fn login_by_id(&self, id: Uuid) -> Result<ApiKey, Error>;

    /// Revoke every key of a user.
    async fn logout(&self, id: Uuid) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    async fn list_user_ids(&self) -> Result<Vec<Uuid>, Error>;

    async fn find_user(&self, id: Uuid) -> Result<User, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// ACLs and limits of the key's owner. Unknown and expired keys are
    /// [`Forbidden`](crate::domain::ErrorCode::Forbidden).
    async fn authorize(&self, key: Uuid) -> Result<Authorization, Error>;
}
