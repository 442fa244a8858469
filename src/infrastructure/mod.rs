//! Infrastructure layer modules
//!
//! - `postgres`: PostgreSQL connection pool

pub mod postgres;
