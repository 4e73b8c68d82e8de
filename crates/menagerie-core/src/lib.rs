//! # menagerie-core
//!
//! Core types, traits, and abstractions for the menagerie image generation
//! job system.
//!
//! This crate provides the job model and state machine, the error type, and
//! the `JobStore` / `GenerationProvider` traits the other crates implement.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ProviderError, Result};
pub use models::*;
pub use traits::*;
