//! Per-test databases on the embedded cluster.
//!
//! Every context gets its own temporary database with the embedded
//! migrations applied and a small pool over it. The database is dropped
//! together with the context.

#![allow(dead_code)]

use pg_embedded_setup_unpriv::{TemporaryDatabase, TestCluster};
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use stellar_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};

use super::cluster_skip::handle_cluster_setup_failure;
use super::pg_embed::test_cluster;

/// Render a `postgres` error with its SQLSTATE and detail; `Display` alone
/// often collapses to "db error".
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// A migrated database and a pool over it. Fields drop in order, so the
/// pool closes before the database and the cluster go away.
pub struct DbContext {
    pub pool: DbPool,
    pub runtime: Runtime,
    pub url: String,
    _database: TemporaryDatabase,
    _cluster: TestCluster,
}

impl DbContext {
    /// A plain client for seeding rows the adapters never write.
    pub fn client(&self) -> Client {
        Client::connect(&self.url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)))
    }

    /// Run `sql` and return the single `bigint` it yields.
    pub fn count(&self, sql: &str) -> i64 {
        self.client()
            .query_one(sql, &[])
            .map(|row| row.get::<_, i64>(0))
            .unwrap_or_else(|err| panic!("{sql}: {}", format_postgres_error(&err)))
    }
}

fn setup() -> Result<DbContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let name = format!("stellar_{}", Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_owned();
    runtime
        .block_on(run_migrations(&url))
        .map_err(|err| err.to_string())?;
    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(&url).with_max_size(2)))
        .map_err(|err| err.to_string())?;
    Ok(DbContext {
        pool,
        runtime,
        url,
        _database: database,
        _cluster: cluster,
    })
}

/// Fixture body for the adapter suites; `None` when the cluster cannot start
/// and skipping is allowed.
pub fn db_context() -> Option<DbContext> {
    match setup() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
