// Defaults and environment-backed settings. Read lazily, so `.env` must be
// loaded before the first dereference.

use std::env;

pub const DEFAULT_PORT: u16 = 9900;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;

lazy_static::lazy_static! {
    pub static ref GEMINI_API_KEY: Option<String> = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("VITE_GEMINI_API_KEY"))
        .ok()
        .filter(|key| !key.trim().is_empty());
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
    pub static ref GEMINI_API_BASE_URL: String = env::var("GEMINI_API_BASE_URL").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref COMPANY_NAME: String = env::var("COMPANY_NAME").unwrap_or_else(|_| "Shnoor International LLC".to_string());
}
