//! OpenAI-compatible API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// IMAGE GENERATION TYPES
// =============================================================================

/// Request body for the `/images/generations` endpoint.
#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: usize,
}

/// Response from the `/images/generations` endpoint.
#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

/// One generated image, either hosted or inline.
#[derive(Debug, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

impl ImageData {
    /// Hosted URL, or the inline payload as a `data:` URI.
    pub fn into_reference(self) -> Option<String> {
        self.url
            .or_else(|| self.b64_json.map(|b64| format!("data:image/png;base64,{}", b64)))
    }
}

// =============================================================================
// CHAT COMPLETION TYPES
// =============================================================================

/// Request body for the `/chat/completions` endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Output modalities; OpenRouter image models need `["image", "text"]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<String>>,
}

/// A single chat message.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Plain text, or a list of typed parts for multimodal input.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Response from the `/chat/completions` endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

/// Assistant message; image models attach generated images.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<ResponseImage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseImage {
    pub image_url: ImageUrl,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multimodal_message_serialization() {
        let message = ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "what is this".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "https://example.com/a.png".to_string(),
                    },
                },
            ]),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "what is this");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_text_message_serializes_as_string() {
        let message = ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Text("a cute cat".to_string()),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"], "a cute cat");
    }

    #[test]
    fn test_modalities_skipped_when_absent() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![],
            modalities: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("modalities").is_none());
    }

    #[test]
    fn test_image_data_prefers_url() {
        let data: ImageData =
            serde_json::from_str(r#"{"url": "https://x/1.png", "b64_json": "AAAA"}"#).unwrap();
        assert_eq!(data.into_reference().as_deref(), Some("https://x/1.png"));
    }

    #[test]
    fn test_image_data_inline_payload() {
        let data: ImageData = serde_json::from_str(r#"{"b64_json": "iVBORw0"}"#).unwrap();
        assert_eq!(
            data.into_reference().as_deref(),
            Some("data:image/png;base64,iVBORw0")
        );
    }

    #[test]
    fn test_chat_response_with_images() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "images": [{"type": "image_url", "image_url": {"url": "data:image/png;base64,AA"}}]
                }
            }]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.images.len(), 1);
        assert!(response.choices[0].message.content.is_none());
    }
}
