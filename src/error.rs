use thiserror::Error;

pub const MALFORMED_RESPONSE_TEXT: &str = "Currently unable to generate a response.";
pub const TRANSPORT_FAILURE_TEXT: &str = "Error connecting to AI service.";

/// Why a remote answer could not be produced. Never surfaced to the user
/// directly; each kind maps to a fixed bot reply.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("response did not contain candidate text: {0}")]
    MalformedResponse(String),

    #[error("request to the generation service failed: {0}")]
    TransportFailure(String),

    #[error("no API key configured for the generation service")]
    MissingApiKey,
}

impl ResolveError {
    pub fn fallback_text(&self) -> &'static str {
        match self {
            ResolveError::MalformedResponse(_) => MALFORMED_RESPONSE_TEXT,
            ResolveError::TransportFailure(_) | ResolveError::MissingApiKey => TRANSPORT_FAILURE_TEXT,
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::TransportFailure(e.to_string())
    }
}
