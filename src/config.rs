use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::logw;

pub const PLACES_KEY_VAR: &str = "GOOGLE_PLACES_API_KEY";
pub const EXTRACTION_KEY_VAR: &str = "GROQ_API_KEY";
pub const PROMPT_KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_PLACES_BASE: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_EXTRACTION_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_PROMPT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_EXTRACTION_MODEL: &str = "deepseek-r1-distill-llama-70b";

/// Model name plus sampling temperature for one chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
}

/// The three provider secrets. Read once at start-up, never mutated.
#[derive(Clone)]
pub struct Credentials {
    pub places_api_key: String,
    pub extraction_api_key: String,
    pub prompt_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("places_api_key", &"<redacted>")
            .field("extraction_api_key", &"<redacted>")
            .field("prompt_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub places_base: String,
    pub extraction_chat_url: String,
    pub prompt_chat_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            places_base: DEFAULT_PLACES_BASE.to_string(),
            extraction_chat_url: DEFAULT_EXTRACTION_CHAT_URL.to_string(),
            prompt_chat_url: DEFAULT_PROMPT_CHAT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub extraction: ModelSettings,
}

impl Config {
    /// Seeds the process environment from `.env` (if present), then reads it.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Reads the process environment as-is, without touching `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests can
    /// feed a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = load_credentials(&lookup)?;

        let url = |var: &str, default: &str| -> Result<String, ConfigError> {
            match lookup(var).filter(|v| !v.trim().is_empty()) {
                None => Ok(default.to_string()),
                Some(raw) => {
                    let raw = raw.trim().trim_end_matches('/').to_string();
                    if raw.starts_with("http://") || raw.starts_with("https://") {
                        Ok(raw)
                    } else {
                        Err(ConfigError::InvalidEnvVar {
                            var: var.to_string(),
                            reason: format!("expected an http(s) URL, got {raw:?}"),
                        })
                    }
                }
            }
        };

        let endpoints = Endpoints {
            places_base: url("PLACES_API_BASE", DEFAULT_PLACES_BASE)?,
            extraction_chat_url: url("EXTRACTION_CHAT_URL", DEFAULT_EXTRACTION_CHAT_URL)?,
            prompt_chat_url: url("PROMPT_CHAT_URL", DEFAULT_PROMPT_CHAT_URL)?,
        };

        let extraction = ModelSettings {
            model: lookup("EXTRACTION_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            temperature: 0.0,
        };

        Ok(Self {
            credentials,
            endpoints,
            extraction,
        })
    }
}

/// Requires all three credentials. Empty strings count as missing. The first
/// missing one is reported with a hint on where to get it.
pub fn load_credentials<F>(lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |var: &str, hint: &str| -> Result<String, ConfigError> {
        lookup(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: var.to_string(),
                hint: hint.to_string(),
            })
    };

    Ok(Credentials {
        places_api_key: require(
            PLACES_KEY_VAR,
            "Google Places API key; set it in your .env file",
        )?,
        extraction_api_key: require(
            EXTRACTION_KEY_VAR,
            "AI scraping will not work; get a free key from https://console.groq.com/",
        )?,
        prompt_api_key: require(
            PROMPT_KEY_VAR,
            "AI prompt creation will not work; get a key from https://platform.openai.com/",
        )?,
    })
}

/// Boolean form of [`load_credentials`] that logs the diagnostic.
pub fn validate_credentials<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match load_credentials(lookup) {
        Ok(_) => true,
        Err(err) => {
            logw(err.to_string());
            false
        }
    }
}
