use thiserror::Error;

/// Start-up problems: credentials, env overrides, prompt template stores.
/// All of these are raised before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} not set ({hint})")]
    MissingCredential { var: String, hint: String },

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("prompt templates {path}: {reason}")]
    Templates { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("business not found: {query}")]
    NotFound { query: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("{service} returned an error: {message}")]
    Provider { service: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("website extraction failed: {message}")]
    Extraction { message: String },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("model reply is not a valid video prompt ({source}); raw reply:\n{raw}")]
    SynthesisParse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}
