//! PostgreSQL-backed `AuthorizationRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AuthorizationRepository, AuthorizationRepositoryError};
use crate::domain::{Acl, Limit};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AclPermissionRow, AclRow};
use super::pool::{DbPool, PoolError};
use super::schema::{acl_permissions, acls, limits, user_limits};

/// Diesel-backed implementation of the `AuthorizationRepository` port.
#[derive(Clone)]
pub struct DieselAuthorizationRepository {
    pool: DbPool,
}

impl DieselAuthorizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthorizationRepositoryError {
    map_basic_pool_error(error, AuthorizationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuthorizationRepositoryError {
    map_basic_diesel_error(
        error,
        AuthorizationRepositoryError::query,
        AuthorizationRepositoryError::connection,
    )
}

#[async_trait]
impl AuthorizationRepository for DieselAuthorizationRepository {
    async fn acls_for_user(&self, user: Uuid) -> Result<Vec<Acl>, AuthorizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AclRow> = acls::table
            .filter(acls::api_user.eq(user))
            .select(AclRow::as_select())
            .order((acls::created_at.asc(), acls::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let permissions: Vec<AclPermissionRow> = acl_permissions::table
            .filter(acl_permissions::acl.eq_any(ids))
            .select(AclPermissionRow::as_select())
            .order((acl_permissions::acl, acl_permissions::permission))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut by_acl: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in permissions {
            by_acl.entry(row.acl).or_default().push(row.permission);
        }
        Ok(rows
            .into_iter()
            .map(|row| Acl {
                permissions: by_acl.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user: row.api_user,
                resource: row.resource,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn limits_for_user(
        &self,
        user: Uuid,
    ) -> Result<Vec<Limit>, AuthorizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, String)> = limits::table
            .inner_join(user_limits::table)
            .filter(user_limits::api_user.eq(user))
            .select((limits::name, limits::value))
            .order((user_limits::name.asc(), limits::name.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, value)| Limit { name, value })
            .collect())
    }
}
