//! Extraction strategies: a JSON Schema plus the instruction sent with it.
//! The schemas are part of the contract with the extraction model. Keys are
//! sent in the order written here (serde_json `preserve_order`).

use serde_json::{Value, json};

use crate::extract::ExtractionMode;

#[derive(Debug, Clone)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub schema: Value,
    pub instruction: &'static str,
}

impl ExtractionStrategy {
    pub fn system_prompt(&self) -> String {
        format!(
            "You extract structured data from website content. Reply with one JSON object \
             that conforms to this JSON Schema and nothing else:\n{}",
            serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
        )
    }

    pub fn required_keys(&self) -> Vec<&str> {
        self.schema["required"]
            .as_array()
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

const BUSINESS_INFO_INSTRUCTION: &str = "Extract comprehensive business information from this website. Focus on identifying \
keywords that would be useful for SEO, local search, and business categorization. \
Include all relevant services, features, and contact information. Be thorough but \
accurate in your extraction.";

const AI_VIDEO_INSTRUCTION: &str = "Extract comprehensive business information to create AI marketing video prompts for Google Veo 3. \
Focus on identifying visual elements, brand identity, target audience, and creating multiple video concepts. \
Each video concept should be detailed enough to generate a complete Google Veo 3 prompt with description, \
style, camera, lighting, elements, motion, and keywords. Be creative and thorough in identifying \
all potential video angles and opportunities that showcase the business effectively.";

/// `influencer` and `ai_video` share the video strategy.
pub fn strategy_for(mode: ExtractionMode) -> ExtractionStrategy {
    match mode {
        ExtractionMode::Full => business_info_strategy(),
        ExtractionMode::Influencer | ExtractionMode::AiVideo => ai_video_strategy(),
    }
}

pub fn business_info_strategy() -> ExtractionStrategy {
    ExtractionStrategy {
        name: "business_info",
        schema: business_info_schema(),
        instruction: BUSINESS_INFO_INSTRUCTION,
    }
}

pub fn ai_video_strategy() -> ExtractionStrategy {
    ExtractionStrategy {
        name: "ai_video_content",
        schema: ai_video_schema(),
        instruction: AI_VIDEO_INSTRUCTION,
    }
}

pub fn business_info_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "business_name": {
                "type": "string",
                "description": "Full business name"
            },
            "description": {
                "type": "string",
                "description": "Brief description of the business"
            },
            "keywords": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Relevant keywords for SEO and business categorization"
            },
            "services_offered": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of services or products offered"
            },
            "business_hours": {
                "type": "string",
                "description": "Operating hours if found"
            },
            "contact_information": {
                "type": "object",
                "properties": {
                    "phone": {"type": "array", "items": {"type": "string"}},
                    "email": {"type": "array", "items": {"type": "string"}},
                    "address": {"type": "string"}
                }
            },
            "social_media": {
                "type": "object",
                "properties": {
                    "facebook": {"type": "string"},
                    "twitter": {"type": "string"},
                    "instagram": {"type": "string"},
                    "linkedin": {"type": "string"},
                    "youtube": {"type": "string"}
                }
            },
            "special_features": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Special features, amenities, or unique selling points"
            },
            "target_audience": {
                "type": "string",
                "description": "Who this business serves"
            },
            "price_range": {
                "type": "string",
                "description": "Price range if mentioned (e.g., $, $$, $$$)"
            },
            "business_type": {
                "type": "string",
                "description": "Type of business (restaurant, retail, service, etc.)"
            },
            "location_features": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Location-specific features (parking, accessibility, etc.)"
            },
            "additional_notes": {
                "type": "string",
                "description": "Any other relevant information"
            }
        },
        "required": ["business_name", "description", "keywords"]
    })
}

pub fn ai_video_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "business_identity": {
                "type": "object",
                "properties": {
                    "brand_name": {"type": "string", "description": "Business/brand name"},
                    "brand_story": {"type": "string", "description": "Compelling brand story and mission"},
                    "unique_selling_points": {"type": "array", "items": {"type": "string"}, "description": "What makes this business unique"},
                    "brand_values": {"type": "array", "items": {"type": "string"}, "description": "Core brand values and personality"}
                },
                "description": "Core business identity and brand information"
            },
            "visual_elements": {
                "type": "object",
                "properties": {
                    "primary_products": {"type": "array", "items": {"type": "string"}, "description": "Main products or services to feature"},
                    "visual_style": {"type": "string", "description": "Desired visual aesthetic (e.g., modern, rustic, luxury, minimalist)"},
                    "color_palette": {"type": "array", "items": {"type": "string"}, "description": "Brand colors and visual themes"},
                    "environmental_elements": {"type": "array", "items": {"type": "string"}, "description": "Physical environment elements (interior, exterior, props)"},
                    "texture_materials": {"type": "array", "items": {"type": "string"}, "description": "Materials and textures to feature"}
                },
                "description": "Visual elements for video creation"
            },
            "target_audience": {
                "type": "object",
                "properties": {
                    "demographics": {"type": "array", "items": {"type": "string"}},
                    "interests": {"type": "array", "items": {"type": "string"}},
                    "lifestyle": {"type": "array", "items": {"type": "string"}},
                    "emotional_triggers": {"type": "array", "items": {"type": "string"}, "description": "Emotions to evoke in the audience"}
                },
                "description": "Target audience insights for video messaging"
            },
            "video_concepts": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "concept_name": {"type": "string", "description": "Name of the video concept"},
                        "description": {"type": "string", "description": "Detailed description of the video scene"},
                        "style": {"type": "string", "description": "Visual style (cinematic, photorealistic, etc.)"},
                        "camera": {"type": "string", "description": "Camera movement and positioning"},
                        "lighting": {"type": "string", "description": "Lighting setup and mood"},
                        "environment": {"type": "string", "description": "Setting and location"},
                        "elements": {"type": "array", "items": {"type": "string"}, "description": "Key visual elements to include"},
                        "motion": {"type": "string", "description": "Movement and animation description"},
                        "ending": {"type": "string", "description": "How the video should conclude"},
                        "text": {"type": "string", "description": "Text overlays or call-to-action"},
                        "keywords": {"type": "array", "items": {"type": "string"}, "description": "Keywords for AI video generation"}
                    }
                },
                "description": "Multiple video concept ideas for Google Veo 3"
            },
            "brand_assets": {
                "type": "object",
                "properties": {
                    "logo_description": {"type": "string", "description": "How to incorporate the brand logo"},
                    "tagline": {"type": "string", "description": "Brand tagline or slogan"},
                    "signature_elements": {"type": "array", "items": {"type": "string"}, "description": "Signature brand elements to feature"}
                },
                "description": "Brand assets to incorporate in videos"
            },
            "call_to_action": {
                "type": "object",
                "properties": {
                    "primary_cta": {"type": "string", "description": "Main call-to-action message"},
                    "secondary_cta": {"type": "string", "description": "Secondary call-to-action options"},
                    "contact_info": {"type": "string", "description": "How to display contact information"}
                },
                "description": "Call-to-action elements for video"
            },
            "technical_specs": {
                "type": "object",
                "properties": {
                    "aspect_ratio": {"type": "string", "description": "Video aspect ratio (16:9, 9:16, etc.)"},
                    "duration": {"type": "string", "description": "Target video duration"},
                    "quality": {"type": "string", "description": "Desired video quality level"}
                },
                "description": "Technical specifications for video generation"
            }
        },
        "required": ["business_identity", "visual_elements", "target_audience", "video_concepts"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_schema_required_keys() {
        assert_eq!(
            business_info_strategy().required_keys(),
            vec!["business_name", "description", "keywords"]
        );
    }

    #[test]
    fn video_schema_required_keys() {
        assert_eq!(
            ai_video_strategy().required_keys(),
            vec![
                "business_identity",
                "visual_elements",
                "target_audience",
                "video_concepts"
            ]
        );
    }

    #[test]
    fn system_prompt_keeps_schema_key_order() {
        let prompt = business_info_strategy().system_prompt();
        let at = |key: &str| prompt.find(key).unwrap_or_else(|| panic!("{key} missing"));
        assert!(at("\"type\"") < at("\"properties\""));
        assert!(at("\"business_name\"") < at("\"services_offered\""));
        assert!(at("\"services_offered\"") < at("\"additional_notes\""));

        let schema = ai_video_schema();
        let keys: Vec<&String> = schema["properties"]
            .as_object()
            .expect("properties")
            .keys()
            .collect();
        assert_eq!(
            keys,
            [
                "business_identity",
                "visual_elements",
                "target_audience",
                "video_concepts",
                "brand_assets",
                "call_to_action",
                "technical_specs"
            ]
        );
    }

    #[test]
    fn influencer_aliases_the_video_strategy() {
        assert_eq!(strategy_for(ExtractionMode::Influencer).name, "ai_video_content");
        assert_eq!(strategy_for(ExtractionMode::AiVideo).name, "ai_video_content");
        assert_eq!(strategy_for(ExtractionMode::Full).name, "business_info");
    }

    #[test]
    fn video_concepts_mirror_prompt_fields() {
        let schema = ai_video_schema();
        let props = schema["properties"]["video_concepts"]["items"]["properties"]
            .as_object()
            .expect("concept properties");
        for key in ["description", "style", "camera", "lighting", "environment", "elements", "motion", "ending", "text", "keywords"] {
            assert!(props.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn system_prompt_embeds_schema() {
        let prompt = business_info_strategy().system_prompt();
        assert!(prompt.contains("\"business_name\""));
        assert!(prompt.contains("JSON Schema"));
    }
}
