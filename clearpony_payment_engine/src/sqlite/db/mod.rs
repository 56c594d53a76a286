//! # SQLite database methods
//!
//! This module contains the low-level SQLite interactions.
//!
//! All of these are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection` argument.
//! Callers obtain a connection from a pool, or open a transaction as the need arises, and call through without any
//! other changes.
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod intents;
pub mod merchants;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
