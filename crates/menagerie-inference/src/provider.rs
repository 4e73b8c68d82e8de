//! Provider selection.
//!
//! The composition root describes the provider it wants with
//! [`ProviderSettings`] and [`build_provider`] turns that into a shared trait
//! object.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use menagerie_core::defaults::{IMAGE_TIMEOUT_SECS, MOCK_PROVIDER_DELAY_SECS, VISION_TIMEOUT_SECS};
use menagerie_core::{Error, GenerationProvider, Result};

use crate::mock::MockProvider;
use crate::openai::{OpenAIConfig, OpenAIProvider};

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Mock,
    OpenRouter,
    OpenAI,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAI),
            _ => Err(Error::Config(format!(
                "Unknown provider type: {}. Supported types: mock, openrouter, openai",
                s
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::OpenRouter => write!(f, "openrouter"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

/// Everything needed to construct a provider.
///
/// `None` for a model or base URL means the kind's default.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub image_model: Option<String>,
    pub vision_model: Option<String>,
    pub timeout_seconds: u64,
    pub vision_timeout_seconds: u64,
    /// Mock latency per requested image.
    pub mock_delay: Duration,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            api_key: None,
            base_url: None,
            image_model: None,
            vision_model: None,
            timeout_seconds: IMAGE_TIMEOUT_SECS,
            vision_timeout_seconds: VISION_TIMEOUT_SECS,
            mock_delay: Duration::from_secs_f64(MOCK_PROVIDER_DELAY_SECS),
            site_url: None,
            site_name: None,
        }
    }
}

impl ProviderSettings {
    /// Settings for the given kind with every other value defaulted.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    fn openai_config(&self) -> Result<OpenAIConfig> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("API key is required for the {} provider", self.kind))
            })?;

        let mut config = match self.kind {
            ProviderKind::OpenRouter => {
                let mut config = OpenAIConfig::openrouter(Some(api_key));
                config.http_referer = self.site_url.clone();
                config.x_title = self.site_name.clone();
                config
            }
            _ => OpenAIConfig::openai(Some(api_key)),
        };

        if let Some(ref base_url) = self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ref model) = self.image_model {
            config.image_model = model.clone();
        }
        if let Some(ref model) = self.vision_model {
            config.vision_model = model.clone();
        }
        config.timeout_seconds = self.timeout_seconds;
        config.vision_timeout_seconds = self.vision_timeout_seconds;
        Ok(config)
    }
}

/// Build the provider described by `settings`.
pub fn build_provider(settings: &ProviderSettings) -> Result<Arc<dyn GenerationProvider>> {
    info!(
        subsystem = "inference",
        component = "provider",
        provider = %settings.kind,
        "Building generation provider"
    );

    match settings.kind {
        ProviderKind::Mock => Ok(Arc::new(MockProvider::new().with_delay(settings.mock_delay))),
        ProviderKind::OpenRouter | ProviderKind::OpenAI => {
            let provider = OpenAIProvider::new(settings.openai_config()?)?;
            Ok(Arc::new(provider))
        }
    }
}
