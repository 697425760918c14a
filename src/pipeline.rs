use reqwest::Client;
use std::io::Write;
use std::sync::Arc;

use crate::api::{ChatClient, PlacesClient};
use crate::business::{BusinessLookup, BusinessQuery, CandidatePolicy};
use crate::config::Config;
use crate::crawl::Crawler;
use crate::error::PipelineError;
use crate::extract::{ContentExtractor, ExtractionMode, WebsiteExtractor};
use crate::prompts::{PromptSynthesizer, TemplateSource, VeoPrompt};
use crate::{logi, logok, logw};

const BANNER_WIDTH: usize = 50;
pub const BANNER_TITLE: &str = "VEO3 PROMPT GENERATED!";

/// Resolver -> extractor -> synthesizer for one business.
pub struct Pipeline {
    resolver: Box<dyn BusinessLookup>,
    extractor: Box<dyn ContentExtractor>,
    synthesizer: PromptSynthesizer,
    mode: ExtractionMode,
}

impl Pipeline {
    pub fn new(
        resolver: Box<dyn BusinessLookup>,
        extractor: Box<dyn ContentExtractor>,
        synthesizer: PromptSynthesizer,
    ) -> Self {
        Self {
            resolver,
            extractor,
            synthesizer,
            mode: ExtractionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Wires the live providers from configuration. One HTTP client is shared
    /// by every component.
    pub fn from_config(
        config: &Config,
        client: Client,
        templates: Box<dyn TemplateSource>,
        policy: CandidatePolicy,
    ) -> Self {
        let creds = &config.credentials;

        let places = PlacesClient::new(
            client.clone(),
            &config.endpoints.places_base,
            &creds.places_api_key,
        )
        .with_policy(policy);

        let extraction_model = Arc::new(ChatClient::new(
            client.clone(),
            &config.endpoints.extraction_chat_url,
            &creds.extraction_api_key,
            "groq",
        ));
        let crawler = Crawler::new(client.clone(), extraction_model, config.extraction.clone());

        let prompt_model = Arc::new(ChatClient::new(
            client,
            &config.endpoints.prompt_chat_url,
            &creds.prompt_api_key,
            "openai",
        ));

        Self::new(
            Box::new(places),
            Box::new(WebsiteExtractor::new(crawler)),
            PromptSynthesizer::new(prompt_model, templates),
        )
    }

    /// Runs every stage and returns the prompt without printing it.
    pub async fn generate(&self, query: &BusinessQuery) -> Result<VeoPrompt, PipelineError> {
        let Some(business) = self.resolver.find_one(query).await? else {
            logw("Business not found!");
            return Err(PipelineError::NotFound {
                query: query.search_text(),
            });
        };

        let outcome = self.extractor.extract(business, self.mode).await;
        let Some(brief) = outcome.creative_brief() else {
            let message = outcome
                .error_message()
                .unwrap_or("extraction produced no data")
                .to_string();
            logw(format!("Website extraction failed: {}", message));
            if let Some(raw) = outcome.raw_content() {
                logw(format!("Unparsed extraction output: {}", raw));
            }
            return Err(PipelineError::Extraction { message });
        };
        logi(format!("Creative brief ready ({} bytes)", brief.len()));

        self.synthesizer.synthesize(&brief).await
    }

    /// [`generate`](Self::generate), then the banner and pretty JSON to `out`.
    pub async fn run<W: Write>(
        &self,
        query: &BusinessQuery,
        out: &mut W,
    ) -> Result<VeoPrompt, PipelineError> {
        let prompt = self.generate(query).await?;
        write_banner(out, &prompt)?;
        logok(format!("Done: {}", query.name));
        Ok(prompt)
    }
}

pub fn write_banner<W: Write>(out: &mut W, prompt: &VeoPrompt) -> Result<(), PipelineError> {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{BANNER_TITLE}")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{}", prompt.to_pretty_json()?)?;
    out.flush()?;
    Ok(())
}
