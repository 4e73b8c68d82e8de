//! OpenAI-compatible provider.
//!
//! Works with OpenAI directly and with OpenRouter, which exposes the same
//! HTTP API in front of many image and vision models.

mod backend;
pub mod error;
pub mod types;

pub use backend::{ImageApi, OpenAIConfig, OpenAIProvider};
pub use error::OpenAIErrorCode;
