pub mod api;
pub mod business;
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod schema;

pub use business::{BusinessLookup, BusinessQuery, BusinessRecord, CandidatePolicy};
pub use config::{Config, Credentials};
pub use error::{ConfigError, PipelineError};
pub use extract::{ContentExtractor, ExtractionMode, ExtractionOutcome, WebsiteExtractor};
pub use pipeline::Pipeline;
pub use prompts::{PromptSynthesizer, VeoPrompt};

/// Tagged progress line. Everything goes through `tracing` so the binary
/// decides where it lands (stderr by default, leaving stdout for the prompt).
pub(crate) fn logv(tag: &str, message: &str) {
    match tag {
        "WARN" => tracing::warn!("[{}] {}", tag, message),
        _ => tracing::info!("[{}] {}", tag, message),
    }
}

pub(crate) fn logi(message: impl AsRef<str>) {
    logv("INFO", message.as_ref());
}

pub(crate) fn logok(message: impl AsRef<str>) {
    logv("OK", message.as_ref());
}

pub(crate) fn logw(message: impl AsRef<str>) {
    logv("WARN", message.as_ref());
}
