//! Centralized default constants for the menagerie system.
//!
//! **This module is the single source of truth** for all shared default values.
//! Crates and the worker binary should reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// JOBS
// =============================================================================

/// Smallest number of images a single job may request.
pub const MIN_IMAGES_PER_JOB: i32 = 1;

/// Largest number of images a single job may request.
pub const MAX_IMAGES_PER_JOB: i32 = 10;

/// Time between polls for pending jobs, in milliseconds.
pub const JOB_POLL_INTERVAL_MS: u64 = 1_000;

/// Maximum jobs executing at once within one poll tick.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Upper bound on a single provider call, in seconds.
pub const JOB_TIMEOUT_SECS: u64 = 300;

/// Capacity of the worker event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Prompt template; `{subject}` is replaced by the chosen catalog entry.
pub const PROMPT_TEMPLATE: &str = "a cute {subject}";

// =============================================================================
// PROVIDERS
// =============================================================================

/// Simulated per-image latency of the mock provider, in seconds.
pub const MOCK_PROVIDER_DELAY_SECS: f64 = 2.0;

/// Base URL for mock placeholder images.
pub const MOCK_IMAGE_BASE_URL: &str = "https://placehold.co/512x512/png";

/// HTTP timeout for image generation requests, in seconds.
pub const IMAGE_TIMEOUT_SECS: u64 = 60;

/// HTTP timeout for classification requests, in seconds.
pub const VISION_TIMEOUT_SECS: u64 = 30;

/// OpenAI API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// OpenRouter API endpoint.
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

/// Default image model on OpenAI.
pub const OPENAI_IMAGE_MODEL: &str = "dall-e-3";

/// Default image model on OpenRouter.
pub const OPENROUTER_IMAGE_MODEL: &str = "sourceful/riverflow-v2-max-preview";

/// Default vision model on OpenAI.
pub const OPENAI_VISION_MODEL: &str = "gpt-4o-mini";

/// Default vision model on OpenRouter.
pub const OPENROUTER_VISION_MODEL: &str = "openai/gpt-4o-mini";

/// Error recorded when classification finds nothing.
pub const NO_ANIMALS_DETECTED: &str = "No animals detected in the image";

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout, in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;
