use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Final artifact: a structured text-to-video request. Field order is the
/// order the JSON is printed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeoPrompt {
    pub description: String,
    pub style: String,
    pub camera: String,
    pub lighting: String,
    pub environment: String,
    pub elements: Vec<String>,
    pub motion: String,
    pub audio: String,
    pub ending: String,
    pub text: String,
    pub keywords: Vec<String>,
}

impl VeoPrompt {
    pub fn to_pretty_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self).map_err(|source| PipelineError::Decode {
            context: "video prompt".to_string(),
            source,
        })
    }
}

/// Removes one leading "```json" (or bare "```") marker and one trailing
/// "```" marker, trimming whitespace around both.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.trim_end();
    without_close
        .strip_suffix("```")
        .unwrap_or(without_close)
        .trim()
}

/// Strict parse first, then one retry with code fences stripped. Anything
/// else (trailing commas, stray quotes) is not repaired and comes back as
/// [`PipelineError::SynthesisParse`] with the untouched reply attached.
pub fn parse_veo_reply(reply: &str) -> Result<VeoPrompt, PipelineError> {
    if let Ok(prompt) = serde_json::from_str::<VeoPrompt>(reply) {
        return Ok(prompt);
    }

    serde_json::from_str::<VeoPrompt>(strip_code_fence(reply)).map_err(|source| {
        PipelineError::SynthesisParse {
            raw: reply.to_string(),
            source,
        }
    })
}
