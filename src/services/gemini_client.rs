use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    core::model::GenerativeModel,
    error::{Result, TravelError},
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Sampling parameters sent with every request
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// Client for the Gemini `generateContent` REST endpoint
#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    generation: GenerationConfig,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    async fn generate_content(&self, parts: Vec<Value>) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| TravelError::Unknown(format!("Failed to build HTTP client: {err}")))?;

        let body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": self.generation,
        });

        let request_url = build_generate_url(&self.base_url, &self.model);
        let response = client
            .post(&request_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TravelError::Timeout(format!(
                        "{} did not answer within {}s",
                        self.model,
                        self.timeout.as_secs()
                    ))
                } else {
                    TravelError::Http(err)
                }
            })?;

        let status = response.status();
        let response_text = response.text().await?;

        let response_json: Value = match serde_json::from_str(&response_text) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(TravelError::Model(format!(
                    "HTTP {} error: {}",
                    status, response_text
                )));
            }
            Err(err) => return Err(TravelError::Serialization(err)),
        };

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(TravelError::Model(format!(
                "HTTP {} error: {}",
                status, error_message
            )));
        }

        if !status.is_success() {
            return Err(TravelError::Model(format!(
                "HTTP {} error: {}",
                status, response_text
            )));
        }

        let text = candidate_text(&response_json);
        if text.trim().is_empty() {
            let reason = response_json
                .pointer("/promptFeedback/blockReason")
                .and_then(|value| value.as_str())
                .map(|reason| format!("prompt blocked: {reason}"))
                .unwrap_or_else(|| "response contained no candidate text".to_string());
            return Err(TravelError::Model(reason));
        }

        debug!(target: "travel::model", model = %self.model, chars = text.len(), "model replied");
        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(vec![json!({ "text": prompt })]).await
    }

    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        self.generate_content(vec![
            json!({ "text": prompt }),
            json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": BASE64.encode(image),
                }
            }),
        ])
        .await
    }
}

fn build_generate_url(base_url: &str, model: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    format!("{}/models/{}:generateContent", trimmed, model)
}

/// Concatenate the text parts of the first candidate
fn candidate_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(|parts| parts.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|text| text.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn reply(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn test_build_generate_url() {
        assert_eq!(
            build_generate_url("http://localhost:1234/v1beta/", "gemini-pro"),
            "http://localhost:1234/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "RESPONSE: a" }, { "text": "\nTASKS: []" }] } }]
        });
        assert_eq!(candidate_text(&response), "RESPONSE: a\nTASKS: []");
        assert_eq!(candidate_text(&json!({})), "");
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_config() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Where to go in May?" }] }],
                "generationConfig": { "topK": 40, "maxOutputTokens": 2048 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply("Try Lisbon."))
            .create_async()
            .await;

        let client = GeminiClient::new("test-key".to_string()).with_base_url(server.url());
        let text = client.generate("Where to go in May?").await.unwrap();

        assert_eq!(text, "Try Lisbon.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_image_is_sent_inline() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [
                    { "text": "What is this?" },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                ] }]
            })))
            .with_status(200)
            .with_body(reply("The Eiffel Tower."))
            .create_async()
            .await;

        let client = GeminiClient::new("k".to_string()).with_base_url(server.url());
        let text = client
            .generate_from_image(&[1, 2, 3], "image/png", "What is this?")
            .await
            .unwrap();

        assert_eq!(text, "The Eiffel Tower.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_model_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("bad".to_string()).with_base_url(server.url());
        let err = client.generate("hi").await.unwrap_err();

        assert!(matches!(err, TravelError::Model(ref msg) if msg.contains("API key not valid")));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .expect(1)
            .create_async()
            .await;

        let client = GeminiClient::new("k".to_string()).with_base_url(server.url());
        let err = client.generate("hi").await.unwrap_err();

        assert!(matches!(err, TravelError::Model(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_prompt_reports_reason() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new("k".to_string()).with_base_url(server.url());
        let err = client.generate("hi").await.unwrap_err();

        assert!(matches!(err, TravelError::Model(ref msg) if msg.contains("SAFETY")));
    }
}
