//! Database connection utilities.
//!
//! Connection strings are passed in explicitly; `create_pool_from_env` is
//! the single place the process environment is consulted.

use cadence_error::{StoreError, StoreErrorKind, StoreResult};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::instrument;

/// Establish a single connection to the PostgreSQL database.
///
/// # Errors
///
/// Returns a connection error if the database is unreachable or the URL is
/// malformed.
#[instrument(name = "database.establish_connection", skip(database_url))]
pub fn establish_connection(database_url: &str) -> StoreResult<PgConnection> {
    tracing::debug!("Connecting to PostgreSQL database");
    PgConnection::establish(database_url).map_err(|e| {
        tracing::error!(error = %e, "Failed to establish database connection");
        StoreError::new(StoreErrorKind::Connection(e.to_string()))
    })
}

/// Create a connection pool for the PostgreSQL database.
///
/// # Errors
///
/// Returns a connection error if pool creation fails.
#[instrument(name = "database.create_pool", skip(database_url))]
pub fn create_pool(database_url: &str) -> StoreResult<Pool<ConnectionManager<PgConnection>>> {
    tracing::debug!("Creating PostgreSQL connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder().max_size(10).build(manager).map_err(|e| {
        tracing::error!(error = %e, "Failed to create connection pool");
        StoreError::new(StoreErrorKind::Connection(e.to_string()))
    })
}

/// Create a pool from the `DATABASE_URL` environment variable.
///
/// # Errors
///
/// Returns a connection error if the variable is unset or pool creation
/// fails.
#[instrument(name = "database.create_pool_from_env")]
pub fn create_pool_from_env() -> StoreResult<Pool<ConnectionManager<PgConnection>>> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        tracing::error!("DATABASE_URL environment variable not set");
        StoreError::new(StoreErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;
    create_pool(&database_url)
}
