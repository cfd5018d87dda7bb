//! Port abstraction for user persistence.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already registered this email.
        EmailTaken { email: String } => "email already used: {email}",
        /// The stored version moved on since the user was read.
        OptimisticLock { id: Uuid } => "user {id} is not up to date",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Ids of every user, oldest first.
    async fn list_ids(&self) -> Result<Vec<Uuid>, UserRepositoryError>;

    /// Store `user` if the stored version is still `user.version - 1`.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Delete a user with its keys, ACLs and limits in one transaction.
    /// Returns `false` when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<bool, UserRepositoryError>;
}
