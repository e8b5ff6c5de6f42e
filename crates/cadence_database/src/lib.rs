//! Diesel/Postgres implementation of the Cadence repository traits.
//!
//! Schema lives in [`schema`], row models and their conversions in
//! [`models`], and the trait implementations on [`PgStore`]. The quota
//! guard (`record_if_under`) runs as a single SQL statement so concurrent
//! consumers contend on the database, not in process memory.

#![warn(missing_docs)]

mod connection;
mod models;
pub mod schema;
mod store;

pub use connection::{create_pool, create_pool_from_env, establish_connection};
pub use store::PgStore;
