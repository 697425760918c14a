//! Live page fetch plus schema-constrained LLM extraction.
//!
//! The crawler never raises: every failure is folded into a [`CrawlResult`]
//! with `success == false` and a message, mirroring how crawl engines report.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use tracing::Instrument;

use crate::api::chat::{ChatModel, ChatRequest};
use crate::config::ModelSettings;
use crate::logw;
use crate::schema::ExtractionStrategy;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

/// Upper bound, in bytes, on page text handed to the extraction model.
const MAX_PAGE_BYTES: usize = 60_000;

static DROP_BLOCKS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|svg|template|iframe)\b.*?</(script|style|noscript|svg|template|iframe)\s*>")
        .expect("valid block regex")
});
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h([1-6])\b[^>]*>").expect("valid heading regex"));
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("valid li regex"));
static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(br|/p|/div|/h[1-6]|/li|/tr|/section|/article|/header|/footer)\b[^>]*>")
        .expect("valid break regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));
static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid think regex"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("valid blank line regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z][a-zA-Z0-9]{1,8});")
        .expect("valid entity regex")
});
static SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid spaces regex"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub extracted_content: Option<String>,
    pub cleaned_html: String,
}

impl CrawlResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Crawl session key for a business: spaces become underscores.
pub fn session_key(business_name: &str) -> String {
    format!("business_{}", business_name.replace(' ', "_"))
}

pub struct Crawler {
    client: Client,
    model: Arc<dyn ChatModel>,
    settings: ModelSettings,
}

impl Crawler {
    pub fn new(client: Client, model: Arc<dyn ChatModel>, settings: ModelSettings) -> Self {
        Self {
            client,
            model,
            settings,
        }
    }

    pub async fn run(
        &self,
        url: &str,
        strategy: &ExtractionStrategy,
        session_id: &str,
    ) -> CrawlResult {
        let span = tracing::info_span!("crawl", session = session_id, strategy = strategy.name);
        self.crawl(url, strategy, session_id).instrument(span).await
    }

    async fn crawl(
        &self,
        url: &str,
        strategy: &ExtractionStrategy,
        session_id: &str,
    ) -> CrawlResult {
        let page = match self.fetch_page(url).await {
            Ok(page) => page,
            Err(message) => {
                logw(format!("Failed to fetch {}: {}", url, message));
                return CrawlResult::failed(message);
            }
        };

        let cleaned_html = clean_html(&page);
        let markdown = trim_copy_utf8_safe(&html_to_markdown(&cleaned_html), MAX_PAGE_BYTES);
        if markdown.trim().is_empty() {
            return CrawlResult {
                success: true,
                cleaned_html,
                ..Default::default()
            };
        }

        let request = ChatRequest::new(
            self.settings.clone(),
            strategy.system_prompt(),
            format!(
                "{}\n\nURL: {}\n\nPage content (markdown):\n{}",
                strategy.instruction, url, markdown
            ),
        )
        .json_output()
        .with_user(session_id);

        match self.model.complete(&request).await {
            Ok(reply) => {
                let content = strip_reasoning(&reply);
                CrawlResult {
                    success: true,
                    error_message: None,
                    extracted_content: (!content.is_empty()).then_some(content),
                    cleaned_html,
                }
            }
            Err(err) => {
                logw(format!("Extraction model call failed: {}", err));
                CrawlResult {
                    cleaned_html,
                    ..CrawlResult::failed(err.to_string())
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {} for {}", status.as_u16(), url));
        }
        resp.text()
            .await
            .map_err(|e| format!("failed to read body: {e}"))
    }
}

fn trim_copy_utf8_safe(input: &str, max_bytes: usize) -> String {
    if input.len() <= max_bytes {
        return input.to_string();
    }

    let mut cut = max_bytes;
    while cut > 0 && !input.is_char_boundary(cut) {
        cut -= 1;
    }
    input[..cut].to_string()
}

/// Drops scripts, styles, comments and other non-content blocks.
pub fn clean_html(html: &str) -> String {
    let without_blocks = DROP_BLOCKS_RE.replace_all(html, "");
    COMMENT_RE.replace_all(&without_blocks, "").into_owned()
}

/// Rough markdown rendering: headings and list items keep their markers,
/// block ends become newlines, every other tag is dropped.
pub fn html_to_markdown(html: &str) -> String {
    let text = HEADING_RE.replace_all(html, |caps: &regex::Captures<'_>| {
        let level = caps[1].parse::<usize>().unwrap_or(1);
        format!("\n{} ", "#".repeat(level))
    });
    let text = LIST_ITEM_RE.replace_all(&text, "\n- ");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = SPACES_RE.replace_all(&text, " ");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Numeric references plus the named entities that show up in copy. Unknown
/// names are left untouched. Single pass, so `&amp;lt;` becomes `&lt;`.
fn decode_entities(input: &str) -> String {
    ENTITY_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = match body.strip_prefix('#') {
                Some(num) => {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
                None => named_entity(body),
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "middot" => '\u{b7}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "deg" => '\u{b0}',
        "eacute" => '\u{e9}',
        "egrave" => '\u{e8}',
        "aacute" => '\u{e1}',
        "agrave" => '\u{e0}',
        "iacute" => '\u{ed}',
        "oacute" => '\u{f3}',
        "uacute" => '\u{fa}',
        "ntilde" => '\u{f1}',
        "ccedil" => '\u{e7}',
        "uuml" => '\u{fc}',
        "ouml" => '\u{f6}',
        _ => return None,
    };
    Some(c)
}

/// Reasoning models may prefix the answer with a `<think>` block.
fn strip_reasoning(reply: &str) -> String {
    THINK_RE.replace_all(reply, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_replaces_spaces() {
        assert_eq!(session_key("Hamilton's Bar and Grill"), "business_Hamilton's_Bar_and_Grill");
        assert_eq!(session_key("Solo"), "business_Solo");
    }

    #[test]
    fn clean_html_drops_scripts_styles_and_comments() {
        let html = "<html><head><style>body{color:red}</style><script>var x = '<p>';</script></head>\
                    <body><!-- nav --><p>Fresh oysters</p></body></html>";
        let cleaned = clean_html(html);
        assert!(!cleaned.contains("color:red"));
        assert!(!cleaned.contains("var x"));
        assert!(!cleaned.contains("nav"));
        assert!(cleaned.contains("<p>Fresh oysters</p>"));
    }

    #[test]
    fn markdown_keeps_headings_and_lists() {
        let html = "<h1>Hamilton&#39;s</h1><p>Seafood &amp; steaks</p><ul><li>Oysters</li><li>Ribeye</li></ul>";
        let md = html_to_markdown(html);
        assert!(md.contains("# Hamilton's"), "got: {md}");
        assert!(md.contains("Seafood & steaks"));
        assert!(md.contains("- Oysters"));
        assert!(md.contains("- Ribeye"));
        assert!(!md.contains('<'));
    }

    #[test]
    fn numeric_and_named_entities_are_decoded() {
        let md = html_to_markdown(
            "<p>Joe&#8217;s Caf&eacute; &mdash; open &#x27;til 9 &copy; 2024</p>",
        );
        assert_eq!(md, "Joe\u{2019}s Caf\u{e9} \u{2014} open 'til 9 \u{a9} 2024");
    }

    #[test]
    fn entities_decode_in_a_single_pass() {
        assert_eq!(decode_entities("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn markdown_of_tag_soup_is_empty() {
        assert_eq!(html_to_markdown("<div><span></span></div>"), "");
    }

    #[test]
    fn reasoning_block_is_removed() {
        let reply = "<think>the user wants json</think>\n{\"a\": 1}";
        assert_eq!(strip_reasoning(reply), "{\"a\": 1}");
    }

    #[test]
    fn trim_respects_char_boundaries() {
        let s = "ééé";
        let out = trim_copy_utf8_safe(s, 3);
        assert_eq!(out, "é");
    }
}
