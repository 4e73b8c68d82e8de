//! # menagerie-inference
//!
//! Generation provider backends for menagerie.
//!
//! This crate provides:
//! - `MockProvider` with simulated latency and failure injection
//! - `OpenAIProvider` for OpenAI and OpenRouter image and vision models
//! - Vision answer parsing into animal lists
//! - `build_provider` to pick a backend from `ProviderSettings`
//!
//! # Example
//!
//! ```rust,no_run
//! use menagerie_inference::{build_provider, ProviderKind, ProviderSettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = build_provider(&ProviderSettings::new(ProviderKind::Mock)).unwrap();
//!     let urls = provider.generate_images("a cute cat", 2).await.unwrap();
//!     assert_eq!(urls.len(), 2);
//! }
//! ```

pub mod classify;
pub mod mock;
pub mod openai;
pub mod provider;

pub use classify::{parse_animals, VISION_PROMPT};
pub use mock::MockProvider;
pub use openai::{ImageApi, OpenAIConfig, OpenAIErrorCode, OpenAIProvider};
pub use provider::{build_provider, ProviderKind, ProviderSettings};
