use serde::Deserialize;
use std::path::Path;

use crate::config::ModelSettings;
use crate::error::ConfigError;

pub const BRIEF_PLACEHOLDER: &str = "{creative_brief}";

const DEFAULT_MODEL: &str = "gpt-4-0125-preview";
const DEFAULT_TEMPERATURE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Creative brief -> cinematic natural-language prompt.
    Cinematic,
    /// Cinematic prompt -> VeoPrompt JSON.
    Structured,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StageTemplate {
    #[serde(rename = "system_prompt")]
    pub system: String,
    #[serde(rename = "user_prompt_template")]
    pub user_template: String,
}

impl StageTemplate {
    pub fn render_user(&self, creative_brief: &str) -> String {
        self.user_template.replace(BRIEF_PLACEHOLDER, creative_brief)
    }
}

/// Where the synthesizer gets its prompts and model settings from.
pub trait TemplateSource: Send + Sync {
    fn settings(&self) -> ModelSettings;
    fn load(&self, stage: Stage) -> StageTemplate;
}

const STAGE1_SYSTEM: &str = "You are a creative prompt engineer for Veo v3. Your job is to turn high-level brand video ideas into concise, visually specific, cinematic prompts that will be used to generate videos with Veo. \
Make sure the final prompt includes a tone (e.g. upbeat, nostalgic), camera movement, lighting, setting, and style. Make it Gen-Z appealing and visually stunning.";

const STAGE1_USER: &str = "Turn the following brand creative brief into a cinematic Veo v3 prompt targeted at Gen-Z:

{creative_brief}

Keep it under 700 characters. The result should be visually specific and cinematic enough to pass to Veo's video model. Avoid vagueness.";

const STAGE2_SYSTEM: &str = r#"You are a world-class creative director who specializes in short-form video ads made for Gen Z — think TikTok, Reels, and YouTube Shorts.

Generate a **cinematic video prompt** in JSON format for **Veo v3** that **markets a local business without showing the business itself**. Instead, use storytelling, symbolism, and creator-style formats to evoke what the business feels like.

---

**Target Audience:** Gen Z (18–25)

**DO NOT Include:**
- Any footage, images, or signs from the actual business
- Logos, storefronts, recognizable branding, or real-world identifiers
- Any specific text or visual that could be reverse image-searched

**If the business is a:**
- **Restaurant** → Emphasize the food in a way that makes it **look irresistible** (melting cheese, golden-hour plating, steamy close-ups)
- **Café** → Focus on visually **romanticizing the coffee** (slow-pour shots, cream swirling, mugs against sunlight)

---

**Conceptual Formats to Use:**
1. **POV Voiceovers** – e.g., “POV: You stumbled into the coziest brunch spot and the playlist is all 2014 Tumblr girl vibes.”
2. **Narrative Hooks** – e.g., “I wasn’t going to share this place because I wanted it all to myself…”
3. **Skits/Characters** – e.g., “Mom at brunch: ‘This is the best toast I’ve ever had.’”
4. **Mood Collages** – abstract visuals like “hands holding a coffee,” “sunlight through a window,” or “shoes tapping tile”
5. **Ambient Soundscapes** – play café background sounds, lo-fi music, or ambient city chatter
6. **Conceptual Lines** – e.g., “This place feels like the inside of my comfort zone.”
7. **Geolocation Teases** – e.g., “Somewhere near the green door off Main Street...”
8. **Review-Style Reactions** – e.g., “Just tried the wildest lemonade ever — here’s what happened.”

---

**Visual Style:**
- No literal footage of the business
- Use metaphor, symbolism, or vibe-matching visuals
- Style can be dreamy, surreal, punchy, or mood-heavy
- Golden hour, slow zooms, bokeh, or bold handheld shots welcome

**Audio:**
- **Always include spoken word** (VO, chaotic review, storytime, etc.)
- Capture the **essence** of the business through emotion, tone, or character — not facts
- Example tones: cozy overshare, sarcastic Gen Z monologue, poetic aesthetic, chaotic review

**Viral Checklist:**
- Hook in 3 seconds (gatekeep-y or emotional)
- Relatable tropes (social anxiety, “this is so me,” romanticizing your life)
- Loopable
- Shareable lines: “If you know, you know”

---

**Output Format:**
```json
{
"description": "...",         // Creative summary of the concept
"style": "...",               // Visual tone (e.g., dreamy realism, Gen Z chaos)
"camera": "...",              // Movement or framing
"lighting": "...",            // Mood and feel
"environment": "...",         // Abstract/generalized location (e.g., a window seat at dusk)
"elements": [...],            // Symbolic objects, not business imagery
"motion": "...",              // Scene flow and transitions
"audio": "...",               // Spoken VO, quirky line, skit dialogue
"ending": "...",              // Loop or emotional close
"text": "none",               // No on-screen text
"keywords": [...]             // Veo-style hashtags like #cozyaesthetic, #pov, #hiddenvibe
}"#;

const STAGE2_USER: &str = "Creative brief: {creative_brief}\n\nGenerate the cinematic video prompt now.";

/// Prompts compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn settings(&self) -> ModelSettings {
        ModelSettings {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    fn load(&self, stage: Stage) -> StageTemplate {
        let (system, user_template) = match stage {
            Stage::Cinematic => (STAGE1_SYSTEM, STAGE1_USER),
            Stage::Structured => (STAGE2_SYSTEM, STAGE2_USER),
        };
        StageTemplate {
            system: system.to_string(),
            user_template: user_template.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateStore {
    gpt_settings: ModelSettings,
    stage1: StageTemplate,
    stage2: StageTemplate,
}

/// Prompts read from a JSON store at start-up:
///
/// ```json
/// {
///   "gpt_settings": {"model": "gpt-4-0125-preview", "temperature": 0.9},
///   "stage1": {"system_prompt": "...", "user_prompt_template": "... {creative_brief} ..."},
///   "stage2": {"system_prompt": "...", "user_prompt_template": "... {creative_brief} ..."}
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileTemplates {
    settings: ModelSettings,
    stage1: StageTemplate,
    stage2: StageTemplate,
}

impl FileTemplates {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let label = path.as_ref().display().to_string();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::Templates {
                path: label.clone(),
                reason: format!("failed to read: {e}"),
            })?;
        Self::from_json(&content, &label)
    }

    pub fn from_json(content: &str, label: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Templates {
            path: label.to_string(),
            reason,
        };

        let store: TemplateStore =
            serde_json::from_str(content).map_err(|e| invalid(format!("invalid JSON: {e}")))?;

        if store.gpt_settings.model.trim().is_empty() {
            return Err(invalid("gpt_settings.model is empty".to_string()));
        }
        if !(0.0..=2.0).contains(&store.gpt_settings.temperature) {
            return Err(invalid(format!(
                "gpt_settings.temperature {} is outside 0..=2",
                store.gpt_settings.temperature
            )));
        }
        for (name, stage) in [("stage1", &store.stage1), ("stage2", &store.stage2)] {
            if !stage.user_template.contains(BRIEF_PLACEHOLDER) {
                return Err(invalid(format!(
                    "{name}.user_prompt_template lacks {BRIEF_PLACEHOLDER}"
                )));
            }
        }

        Ok(Self {
            settings: store.gpt_settings,
            stage1: store.stage1,
            stage2: store.stage2,
        })
    }
}

impl TemplateSource for FileTemplates {
    fn settings(&self) -> ModelSettings {
        self.settings.clone()
    }

    fn load(&self, stage: Stage) -> StageTemplate {
        match stage {
            Stage::Cinematic => self.stage1.clone(),
            Stage::Structured => self.stage2.clone(),
        }
    }
}
