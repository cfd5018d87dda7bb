//! Read access to the ACLs and limits granted to users.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Acl, Limit};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised while reading authorizations.
    pub enum AuthorizationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "authorization repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "authorization repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    async fn acls_for_user(&self, user: Uuid) -> Result<Vec<Acl>, AuthorizationRepositoryError>;

    /// Every limit of every limit group attached to `user`.
    async fn limits_for_user(&self, user: Uuid)
    -> Result<Vec<Limit>, AuthorizationRepositoryError>;
}
