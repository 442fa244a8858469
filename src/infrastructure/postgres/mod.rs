//! PostgreSQL persistence module.
//!
//! Provides connection pooling for the PostgreSQL template backend.

pub mod pool;

pub use pool::{mask_url, PostgresPool, PostgresPoolError};
