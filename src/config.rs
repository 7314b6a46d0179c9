//! Explicit runtime configuration handed to the resolver at construction.

use crate::constants;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Company the assistant speaks for; used in the greeting and the persona preamble.
    pub company: String,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl ChatConfig {
    /// Snapshot of the environment-backed settings in `constants`.
    pub fn from_env() -> Self {
        Self {
            company: constants::COMPANY_NAME.clone(),
            api_key: constants::GEMINI_API_KEY.clone(),
            model: constants::GEMINI_MODEL.clone(),
            api_base_url: constants::GEMINI_API_BASE_URL.clone(),
            temperature: constants::DEFAULT_TEMPERATURE,
            max_output_tokens: constants::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The configured key, treating blank values as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hello 👋 I’m the AI assistant for {}. How can I help you today?",
            self.company
        )
    }
}
