//! Shared fixtures and stubs for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use localfluence::api::{ChatModel, ChatRequest};
use localfluence::{BusinessRecord, PipelineError};

pub const HAMILTONS_NAME: &str = "Hamilton's";
pub const HAMILTONS_ADDRESS: &str = "174 E Magnolia Ave, Auburn, AL 36830, USA";

pub const VEO_JSON: &str = r##"{
  "description": "POV: the booth that feels like the inside of your comfort zone",
  "style": "dreamy realism with punchy handheld inserts",
  "camera": "slow push-in, then a whip pan to a steaming plate",
  "lighting": "golden hour through venetian blinds",
  "environment": "a window seat at dusk on a quiet brick street",
  "elements": ["melting butter", "clinking glasses", "steam curling off a plate"],
  "motion": "match cuts between hands, forks and candle flicker",
  "audio": "cozy overshare VO: I wasn't going to share this place...",
  "ending": "cuts back to the first sip so it loops",
  "text": "none",
  "keywords": ["#cozyaesthetic", "#pov", "#hiddenvibe"]
}"##;

pub const CINEMATIC: &str = "Golden-hour close-ups of sizzling seafood, slow push-ins, warm bokeh, upbeat Gen-Z voiceover.";

pub fn hamiltons_record(website: Option<&str>) -> BusinessRecord {
    BusinessRecord {
        name: HAMILTONS_NAME.to_string(),
        formatted_address: HAMILTONS_ADDRESS.to_string(),
        phone: Some("(334) 887-2005".to_string()),
        website: website.map(str::to_string),
        rating: Some(4.6),
        ratings_count: Some(1432),
        types: vec!["restaurant".to_string(), "food".to_string()],
        ..Default::default()
    }
}

/// Smallest payload that satisfies the AI-video schema's required keys.
pub fn minimal_ai_video_payload() -> Value {
    json!({
        "business_identity": {"brand_name": "Hamilton's", "brand_story": "Downtown Auburn seafood since 2008"},
        "visual_elements": {"primary_products": ["oysters", "ribeye"], "visual_style": "warm and rustic"},
        "target_audience": {"demographics": ["students", "young professionals"]},
        "video_concepts": [{"concept_name": "Date night", "description": "candle-lit plates"}]
    })
}

pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Replays canned replies in order and records every request it receives.
pub struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().expect("lock").len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError> {
        self.seen.lock().expect("lock").push(request.clone());
        Ok(self
            .replies
            .lock()
            .expect("lock")
            .pop()
            .expect("unexpected extra model call"))
    }
}

#[derive(Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
