use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

use crate::business::BusinessRecord;
use crate::crawl::{Crawler, session_key};
use crate::schema::strategy_for;
use crate::{logi, logok, logw};

pub const NO_CONTENT_MESSAGE: &str = "No content extracted";
pub const NO_WEBSITE_MESSAGE: &str = "No website available";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    Full,
    Influencer,
    #[default]
    AiVideo,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Full => "full",
            ExtractionMode::Influencer => "influencer",
            ExtractionMode::AiVideo => "ai_video",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(ExtractionMode::Full),
            "influencer" => Ok(ExtractionMode::Influencer),
            "ai_video" => Ok(ExtractionMode::AiVideo),
            other => Err(format!(
                "extraction mode must be 'full', 'influencer', or 'ai_video' (got {other:?})"
            )),
        }
    }
}

/// What came back from scraping one business website. Failures are values so
/// the caller can branch; every variant keeps the place record for context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        business_info: BusinessRecord,
        website_data: Value,
        raw_html: String,
        extraction_type: ExtractionMode,
    },
    #[serde(rename_all = "camelCase")]
    NoWebsite { business_info: BusinessRecord },
    #[serde(rename_all = "camelCase")]
    Failure {
        business_info: Option<BusinessRecord>,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_content: Option<String>,
    },
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }

    pub fn business_info(&self) -> Option<&BusinessRecord> {
        match self {
            ExtractionOutcome::Success { business_info, .. }
            | ExtractionOutcome::NoWebsite { business_info } => Some(business_info),
            ExtractionOutcome::Failure { business_info, .. } => business_info.as_ref(),
        }
    }

    /// Human-readable reason for a non-success outcome.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Success { .. } => None,
            ExtractionOutcome::NoWebsite { .. } => Some(NO_WEBSITE_MESSAGE),
            ExtractionOutcome::Failure { error, .. } => Some(error),
        }
    }

    /// Model output that could not be parsed, kept for diagnosis.
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Failure { raw_content, .. } => raw_content.as_deref(),
            _ => None,
        }
    }

    /// Creative brief handed to the prompt synthesizer: the place record, the
    /// extracted website data and the mode. The page HTML is left out.
    pub fn creative_brief(&self) -> Option<String> {
        let ExtractionOutcome::Success {
            business_info,
            website_data,
            extraction_type,
            ..
        } = self
        else {
            return None;
        };

        let brief = json!({
            "businessInfo": business_info,
            "websiteData": website_data,
            "extractionType": extraction_type,
        });
        serde_json::to_string_pretty(&brief).ok()
    }
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, business: BusinessRecord, mode: ExtractionMode) -> ExtractionOutcome;
}

pub struct WebsiteExtractor {
    crawler: Crawler,
}

impl WebsiteExtractor {
    pub fn new(crawler: Crawler) -> Self {
        Self { crawler }
    }
}

#[async_trait]
impl ContentExtractor for WebsiteExtractor {
    async fn extract(&self, business: BusinessRecord, mode: ExtractionMode) -> ExtractionOutcome {
        let Some(website) = business.website_url().map(str::to_string) else {
            logw(format!("No website found for {}", business.name));
            return ExtractionOutcome::NoWebsite {
                business_info: business,
            };
        };
        logi(format!("Found website: {} (mode {})", website, mode));

        let strategy = strategy_for(mode);
        let result = self
            .crawler
            .run(&website, &strategy, &session_key(&business.name))
            .await;

        if !result.success {
            let error = result
                .error_message
                .unwrap_or_else(|| "crawl failed".to_string());
            logw(format!("Failed to scrape website: {}", error));
            return ExtractionOutcome::Failure {
                business_info: Some(business),
                error,
                raw_content: None,
            };
        }

        let Some(content) = result
            .extracted_content
            .filter(|c| !c.trim().is_empty())
        else {
            logw("No content extracted from website");
            return ExtractionOutcome::Failure {
                business_info: Some(business),
                error: NO_CONTENT_MESSAGE.to_string(),
                raw_content: None,
            };
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(website_data) => {
                logok(format!("Extracted {} data from {}", strategy.name, website));
                ExtractionOutcome::Success {
                    business_info: business,
                    website_data,
                    raw_html: result.cleaned_html,
                    extraction_type: mode,
                }
            }
            Err(e) => {
                logw(format!("Failed to parse extracted content: {}", e));
                ExtractionOutcome::Failure {
                    business_info: Some(business),
                    error: format!("JSON parsing error: {e}"),
                    raw_content: Some(content),
                }
            }
        }
    }
}
