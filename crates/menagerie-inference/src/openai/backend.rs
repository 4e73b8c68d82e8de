//! OpenAI-compatible generation provider (OpenAI and OpenRouter).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use menagerie_core::defaults::{
    IMAGE_TIMEOUT_SECS, OPENAI_IMAGE_MODEL, OPENAI_URL, OPENAI_VISION_MODEL,
    OPENROUTER_IMAGE_MODEL, OPENROUTER_URL, OPENROUTER_VISION_MODEL, VISION_TIMEOUT_SECS,
};
use menagerie_core::{Classification, Error, GenerationProvider, ProviderError, Result};

use super::error::{to_provider_error, OpenAIErrorCode};
use super::types::*;
use crate::classify::{parse_animals, VISION_PROMPT};

/// How the endpoint produces images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageApi {
    /// `POST /images/generations` with `n` images per request (OpenAI).
    ImageGenerations,
    /// `POST /chat/completions` with image output modality, one request per
    /// image (OpenRouter).
    ChatModalities,
}

/// Configuration for an OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Name used in logs and error messages.
    pub name: String,
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for bearer authentication.
    pub api_key: Option<String>,
    /// Model used for image generation.
    pub image_model: String,
    /// Model used for classification.
    pub vision_model: String,
    pub image_api: ImageApi,
    /// Image generation timeout in seconds.
    pub timeout_seconds: u64,
    /// Classification timeout in seconds.
    pub vision_timeout_seconds: u64,
    /// HTTP-Referer header for OpenRouter.ai rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter.ai (optional).
    pub x_title: Option<String>,
}

impl OpenAIConfig {
    /// Direct OpenAI configuration.
    pub fn openai(api_key: Option<String>) -> Self {
        Self {
            name: "openai".to_string(),
            base_url: OPENAI_URL.to_string(),
            api_key,
            image_model: OPENAI_IMAGE_MODEL.to_string(),
            vision_model: OPENAI_VISION_MODEL.to_string(),
            image_api: ImageApi::ImageGenerations,
            timeout_seconds: IMAGE_TIMEOUT_SECS,
            vision_timeout_seconds: VISION_TIMEOUT_SECS,
            http_referer: None,
            x_title: None,
        }
    }

    /// OpenRouter configuration.
    pub fn openrouter(api_key: Option<String>) -> Self {
        Self {
            name: "openrouter".to_string(),
            base_url: OPENROUTER_URL.to_string(),
            image_model: OPENROUTER_IMAGE_MODEL.to_string(),
            vision_model: OPENROUTER_VISION_MODEL.to_string(),
            image_api: ImageApi::ChatModalities,
            ..Self::openai(api_key)
        }
    }
}

/// Provider speaking the OpenAI HTTP API.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = %config.name,
            base_url = %config.base_url,
            image_model = %config.image_model,
            vision_model = %config.vision_model,
            "Initializing OpenAI-compatible provider"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // Add OpenRouter-specific headers if configured
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    /// Map a non-success response to a provider error.
    async fn error_from_response(&self, response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, error_type) = match serde_json::from_str::<OpenAIErrorResponse>(&body) {
            Ok(parsed) => (
                parsed.error.message,
                parsed.error.error_type.unwrap_or_default(),
            ),
            Err(_) if body.is_empty() => (status.to_string(), String::new()),
            Err(_) => (body, String::new()),
        };
        let code = OpenAIErrorCode::from_response(status.as_u16(), &error_type);
        warn!(
            subsystem = "inference",
            component = %self.config.name,
            status = status.as_u16(),
            ?code,
            "Provider request rejected"
        );
        to_provider_error(code, &format!("{} returned {}: {}", self.config.name, status, message))
    }

    async fn generate_via_images_endpoint(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<String>, ProviderError> {
        let request = ImageGenerationRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            n: count,
        };

        let response = self
            .build_request("/images/generations")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let result: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("Failed to parse response: {}", e)))?;

        Ok(result
            .data
            .into_iter()
            .filter_map(ImageData::into_reference)
            .collect())
    }

    async fn generate_via_chat(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<String>, ProviderError> {
        let mut images = Vec::with_capacity(count);

        for _ in 0..count {
            let request = ChatCompletionRequest {
                model: self.config.image_model.clone(),
                messages: vec![ChatMessage {
                    role: "user".to_string(),
                    content: MessageContent::Text(prompt.to_string()),
                }],
                modalities: Some(vec!["image".to_string(), "text".to_string()]),
            };

            let response = self
                .build_request("/chat/completions")
                .json(&request)
                .send()
                .await
                .map_err(|e| ProviderError::new(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(self.error_from_response(response).await);
            }

            let result: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::new(format!("Failed to parse response: {}", e)))?;

            images.extend(
                result
                    .choices
                    .into_iter()
                    .flat_map(|choice| choice.message.images)
                    .map(|image| image.image_url.url),
            );
        }

        Ok(images)
    }

    async fn request_classification(&self, image_url: &str) -> std::result::Result<String, String> {
        let request = ChatCompletionRequest {
            model: self.config.vision_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: VISION_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url.to_string(),
                        },
                    },
                ]),
            }],
            modalities: None,
        };

        let response = self
            .build_request("/chat/completions")
            .timeout(Duration::from_secs(self.config.vision_timeout_seconds))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Classification failed: {}", e))?;

        if !response.status().is_success() {
            let err = self.error_from_response(response).await;
            return Err(format!("API request failed: {}", err));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("Classification failed: {}", e))?;

        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl GenerationProvider for OpenAIProvider {
    async fn generate_images(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<String>, ProviderError> {
        debug!(
            subsystem = "inference",
            component = %self.config.name,
            op = "generate",
            model = %self.config.image_model,
            count,
            "Requesting images"
        );

        let images = match self.config.image_api {
            ImageApi::ImageGenerations => self.generate_via_images_endpoint(prompt, count).await?,
            ImageApi::ChatModalities => self.generate_via_chat(prompt, count).await?,
        };

        if images.is_empty() {
            return Err(ProviderError::new(format!(
                "{} returned no images",
                self.config.name
            )));
        }

        debug!(
            subsystem = "inference",
            component = %self.config.name,
            op = "generate",
            result_count = images.len(),
            "Images received"
        );
        Ok(images)
    }

    async fn classify_image(&self, image_url: &str) -> Classification {
        match self.request_classification(image_url).await {
            Ok(content) => parse_animals(&content),
            Err(message) => {
                warn!(
                    subsystem = "inference",
                    component = %self.config.name,
                    op = "classify",
                    error = %message,
                    "Classification failed"
                );
                Classification::failed(message)
            }
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
