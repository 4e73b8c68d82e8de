//! Mock generation provider for development and tests.
//!
//! Simulates provider latency and returns placeholder image URLs, so the
//! whole job pipeline can run without any external service.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use menagerie_inference::MockProvider;
//!
//! let provider = MockProvider::new()
//!     .with_delay(Duration::from_millis(10))
//!     .with_failure("rate limited");
//! assert_eq!(provider.generate_call_count(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use menagerie_core::defaults::{MOCK_IMAGE_BASE_URL, NO_ANIMALS_DETECTED};
use menagerie_core::{Classification, GenerationProvider, ProviderError};

/// Mock provider with configurable latency, results, and failures.
///
/// Clones share the same call counters.
#[derive(Debug, Clone)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    generate_calls: Arc<AtomicUsize>,
    classify_calls: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// Latency per requested image.
    delay_per_image: Duration,
    classify_delay: Duration,
    /// Replaces placeholder URLs when set.
    fixed_results: Option<Vec<String>>,
    failure: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            delay_per_image: Duration::ZERO,
            classify_delay: Duration::ZERO,
            fixed_results: None,
            failure: None,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a mock provider that answers immediately.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            generate_calls: Arc::new(AtomicUsize::new(0)),
            classify_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set simulated latency per requested image.
    pub fn with_delay(mut self, delay_per_image: Duration) -> Self {
        Arc::make_mut(&mut self.config).delay_per_image = delay_per_image;
        self
    }

    /// Set simulated classification latency.
    pub fn with_classify_delay(mut self, delay: Duration) -> Self {
        Arc::make_mut(&mut self.config).classify_delay = delay;
        self
    }

    /// Return exactly these references regardless of the requested count.
    pub fn with_results(mut self, results: Vec<String>) -> Self {
        Arc::make_mut(&mut self.config).fixed_results = Some(results);
        self
    }

    /// Fail every generation with this message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Number of `generate_images` calls so far.
    pub fn generate_call_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Number of `classify_image` calls so far.
    pub fn classify_call_count(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }

    /// Placeholder URLs for `prompt`, numbered from 1.
    pub fn placeholder_urls(prompt: &str, count: usize) -> Vec<String> {
        let text = prompt.replace(' ', "+");
        (1..=count)
            .map(|i| format!("{}?text={}+{}", MOCK_IMAGE_BASE_URL, text, i))
            .collect()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate_images(
        &self,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            subsystem = "inference",
            component = "mock",
            op = "generate",
            prompt,
            count,
            "Mock generation"
        );

        let delay = self
            .config
            .delay_per_image
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX));
        if !delay.is_zero() {
            sleep(delay).await;
        }

        if let Some(ref message) = self.config.failure {
            return Err(ProviderError::new(message.clone()));
        }

        Ok(match self.config.fixed_results {
            Some(ref results) => results.clone(),
            None => Self::placeholder_urls(prompt, count),
        })
    }

    async fn classify_image(&self, image_url: &str) -> Classification {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.config.classify_delay.is_zero() {
            sleep(self.config.classify_delay).await;
        }

        let url = image_url.to_lowercase();
        ["cat", "dog", "bird"]
            .into_iter()
            .find(|animal| url.contains(animal))
            .map(|animal| Classification::found(vec![animal.to_string()]))
            .unwrap_or_else(|| Classification::failed(NO_ANIMALS_DETECTED))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generates_numbered_placeholders() {
        let provider = MockProvider::new();
        let urls = provider.generate_images("a cute cat", 3).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://placehold.co/512x512/png?text=a+cute+cat+1",
                "https://placehold.co/512x512/png?text=a+cute+cat+2",
                "https://placehold.co/512x512/png?text=a+cute+cat+3",
            ]
        );
        assert_eq!(provider.generate_call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_message_is_verbatim() {
        let provider = MockProvider::new().with_failure("rate limited");
        let err = provider.generate_images("a cute fox", 2).await.unwrap_err();
        assert_eq!(err.message, "rate limited");
    }

    #[tokio::test]
    async fn test_fixed_results_ignore_count() {
        let provider = MockProvider::new().with_results(vec!["only-one".to_string()]);
        let urls = provider.generate_images("a cute owl", 4).await.unwrap();
        assert_eq!(urls, vec!["only-one"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_scales_with_count() {
        let provider = MockProvider::new().with_delay(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        provider.generate_images("a cute deer", 3).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_clones_share_counters() {
        let provider = MockProvider::new();
        let clone = provider.clone();
        clone.generate_images("a cute wolf", 1).await.unwrap();
        assert_eq!(provider.generate_call_count(), 1);
    }

    #[tokio::test]
    async fn test_classify_matches_url_patterns() {
        let provider = MockProvider::new();
        let cat = provider
            .classify_image("https://example.com/CAT.png")
            .await;
        assert_eq!(cat.animals, vec!["cat"]);

        let none = provider
            .classify_image("https://example.com/tree.png")
            .await;
        assert!(none.animals.is_empty());
        assert_eq!(none.error.as_deref(), Some(NO_ANIMALS_DETECTED));
        assert_eq!(provider.classify_call_count(), 2);
    }
}
