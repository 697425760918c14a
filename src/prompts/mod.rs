//! Two-stage prompt synthesis: creative brief -> cinematic prompt -> VeoPrompt JSON.

mod synthesizer;
pub mod templates;
mod veo;

pub use synthesizer::PromptSynthesizer;
pub use templates::{BuiltinTemplates, FileTemplates, Stage, StageTemplate, TemplateSource};
pub use veo::{VeoPrompt, parse_veo_reply, strip_code_fence};
