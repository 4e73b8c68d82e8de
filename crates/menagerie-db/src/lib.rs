//! # menagerie-db
//!
//! Job store implementations for menagerie.
//!
//! This crate provides:
//! - `InMemoryJobStore` for single-process deployments and tests
//! - `PgJobStore`, a PostgreSQL store with conditional claims
//! - Connection pool management and embedded migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use menagerie_db::{create_pool, run_migrations, PgJobStore};
//! use menagerie_core::{Job, JobStore};
//!
//! let pool = create_pool("postgres://localhost/menagerie").await?;
//! run_migrations(&pool).await?;
//!
//! let store = PgJobStore::new(pool);
//! let job = store.create(&Job::new(3)).await?;
//! ```

pub mod jobs;
pub mod memory;
pub mod pool;

// Re-export core types
pub use menagerie_core::*;

pub use jobs::PgJobStore;
pub use memory::InMemoryJobStore;
#[cfg(feature = "migrations")]
pub use pool::run_migrations;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
