//! HTTP-level tests for the OpenAI-compatible provider.
//!
//! Each test points the provider at a wiremock server and checks both the
//! request it sends and how it maps the response.

use menagerie_core::defaults::NO_ANIMALS_DETECTED;
use menagerie_core::GenerationProvider;
use menagerie_inference::{OpenAIConfig, OpenAIProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config(server: &MockServer) -> OpenAIConfig {
    let mut config = OpenAIConfig::openai(Some("test-key".to_string()));
    config.base_url = server.uri();
    config.image_model = "test-image".to_string();
    config.vision_model = "test-vision".to_string();
    config
}

fn openrouter_config(server: &MockServer) -> OpenAIConfig {
    let mut config = OpenAIConfig::openrouter(Some("or-key".to_string()));
    config.base_url = server.uri();
    config.image_model = "test-image".to_string();
    config.vision_model = "test-vision".to_string();
    config
}

#[tokio::test]
async fn test_images_endpoint_maps_urls_and_inline_payloads() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "created": 1,
        "data": [
            {"url": "https://cdn.example/1.png"},
            {"b64_json": "iVBORw0KGgo"},
            {"url": "https://cdn.example/3.png"}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-image",
            "prompt": "a cute cat",
            "n": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openai_config(&mock_server)).unwrap();
    let images = provider.generate_images("a cute cat", 3).await.unwrap();

    assert_eq!(
        images,
        vec![
            "https://cdn.example/1.png",
            "data:image/png;base64,iVBORw0KGgo",
            "https://cdn.example/3.png",
        ]
    );
}

#[tokio::test]
async fn test_chat_modalities_issues_one_request_per_image() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "",
                "images": [{"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}]
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("HTTP-Referer", "https://menagerie.example"))
        .and(header("X-Title", "Menagerie"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-image",
            "modalities": ["image", "text"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = openrouter_config(&mock_server);
    config.http_referer = Some("https://menagerie.example".to_string());
    config.x_title = Some("Menagerie".to_string());

    let provider = OpenAIProvider::new(config).unwrap();
    let images = provider.generate_images("a cute fox", 2).await.unwrap();

    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i == "data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn test_empty_result_set_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openai_config(&mock_server)).unwrap();
    let err = provider.generate_images("a cute owl", 1).await.unwrap_err();

    assert_eq!(err.message, "openai returned no images");
}

#[tokio::test]
async fn test_rate_limit_response_becomes_provider_error() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {"message": "Too many requests", "type": "rate_limit_exceeded"}
    });

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(429).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openai_config(&mock_server)).unwrap();
    let err = provider.generate_images("a cute wolf", 1).await.unwrap_err();

    assert!(err.message.starts_with("Rate limit exceeded:"), "{}", err.message);
    assert!(err.message.contains("Too many requests"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() {
    let mut config = OpenAIConfig::openai(Some("k".to_string()));
    config.base_url = "http://127.0.0.1:9".to_string();
    config.timeout_seconds = 2;

    let provider = OpenAIProvider::new(config).unwrap();
    let err = provider.generate_images("a cute deer", 1).await.unwrap_err();

    assert!(err.message.starts_with("Request failed:"), "{}", err.message);
}

#[tokio::test]
async fn test_classification_sends_image_part_and_parses_names() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": "cat, dog"}}]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-vision",
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text"},
                    {"type": "image_url", "image_url": {"url": "https://x/pets.png"}}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openrouter_config(&mock_server)).unwrap();
    let result = provider.classify_image("https://x/pets.png").await;

    assert_eq!(result.animals, vec!["cat", "dog"]);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_classification_none_answer() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": "NONE"}}]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openai_config(&mock_server)).unwrap();
    let result = provider.classify_image("https://x/tree.png").await;

    assert!(result.animals.is_empty());
    assert_eq!(result.error.as_deref(), Some(NO_ANIMALS_DETECTED));
}

#[tokio::test]
async fn test_classification_http_failure_is_reported_in_band() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let provider = OpenAIProvider::new(openai_config(&mock_server)).unwrap();
    let result = provider.classify_image("https://x/cat.png").await;

    assert!(result.animals.is_empty());
    let error = result.error.unwrap();
    assert!(error.starts_with("API request failed:"), "{}", error);
    assert!(error.contains("upstream exploded"));
}
