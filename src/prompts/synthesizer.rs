use std::sync::Arc;

use crate::api::chat::{ChatModel, ChatRequest};
use crate::error::PipelineError;
use crate::prompts::templates::{Stage, TemplateSource};
use crate::prompts::veo::{VeoPrompt, parse_veo_reply};
use crate::{logi, logok};

/// Single prompt chain parameterized by where its templates come from.
pub struct PromptSynthesizer {
    model: Arc<dyn ChatModel>,
    templates: Box<dyn TemplateSource>,
}

impl PromptSynthesizer {
    pub fn new(model: Arc<dyn ChatModel>, templates: Box<dyn TemplateSource>) -> Self {
        Self { model, templates }
    }

    fn request(&self, stage: Stage, creative_brief: &str) -> ChatRequest {
        let template = self.templates.load(stage);
        ChatRequest::new(
            self.templates.settings(),
            template.system.clone(),
            template.render_user(creative_brief),
        )
    }

    /// Creative brief -> cinematic prompt. The reply is returned verbatim; the
    /// length cap lives in the prompt, not here.
    pub async fn stage1(&self, creative_brief: &str) -> Result<String, PipelineError> {
        logi("Stage 1: creative brief -> cinematic prompt");
        let reply = self
            .model
            .complete(&self.request(Stage::Cinematic, creative_brief))
            .await?;
        logok(format!("Cinematic prompt ready ({} chars)", reply.chars().count()));
        Ok(reply)
    }

    /// Cinematic prompt -> VeoPrompt, with the code-fence fallback.
    pub async fn stage2(&self, cinematic_prompt: &str) -> Result<VeoPrompt, PipelineError> {
        logi("Stage 2: cinematic prompt -> VeoPrompt JSON");
        let reply = self
            .model
            .complete(&self.request(Stage::Structured, cinematic_prompt))
            .await?;
        let prompt = parse_veo_reply(&reply)?;
        logok(format!("VeoPrompt parsed ({} keywords)", prompt.keywords.len()));
        Ok(prompt)
    }

    pub async fn synthesize(&self, creative_brief: &str) -> Result<VeoPrompt, PipelineError> {
        let cinematic = self.stage1(creative_brief).await?;
        self.stage2(&cinematic).await
    }
}
