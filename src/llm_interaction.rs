use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::ChatConfig;
use crate::error::ResolveError;

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ResolveError>;
}

// Structures matching Gemini's generateContent endpoint
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Serialize, Debug)]
struct RequestPart {
    text: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

/// Pulls `candidates[0].content.parts[0].text` out of a response body.
/// Nothing past the first candidate's first part is looked at.
///
/// A body that is not JSON at all counts as a transport failure; JSON of the
/// wrong shape counts as a malformed response.
pub fn extract_candidate_text(body: &[u8]) -> Result<String, ResolveError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ResolveError::TransportFailure(format!("unparseable response body: {}", e)))?;
    first_candidate_text(&value)
        .map(str::to_string)
        .ok_or_else(|| ResolveError::MalformedResponse(value.to_string()))
}

fn first_candidate_text(value: &serde_json::Value) -> Option<&str> {
    value
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .filter(|text| !text.is_empty())
}

/// Client for `POST {base}/v1beta/models/{model}:generateContent`.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &ChatConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ChatConfig) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base_url.trim_end_matches('/'),
            config.model
        );
        Self {
            client,
            api_key: config.api_key().map(str::to_string),
            endpoint,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, prompt: &str) -> Result<String, ResolveError> {
        let api_key = self.api_key.as_deref().ok_or(ResolveError::MissingApiKey)?;

        let request_payload = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };
        debug!(?prompt, "Sending generateContent request");

        // The status code is deliberately not checked: error bodies are JSON
        // without candidates and fall through to the malformed-response path.
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request_payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Received generateContent response");

        extract_candidate_text(&body)
    }
}
