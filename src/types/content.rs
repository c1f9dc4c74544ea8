use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Social media content strategy: brand voice, audience, and the post
/// concepts the downstream phases consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStrategyRecord {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub brand_voice: Value,
    #[serde(default)]
    pub target_audience: Value,
    #[serde(default)]
    pub content_strategy: Value,
    #[serde(default)]
    pub instagram_posts: Vec<InstagramPost>,
    /// ISO 639-1 code of the caption language the strategy was asked for.
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstagramPost {
    #[serde(default)]
    pub post_number: u32,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subtext: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub target_emotion: String,
}

/// The visual constraints a prompt was synthesized from, kept so a prompt
/// can be audited or reproduced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualSpec {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub alignment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRecord {
    pub post_number: u32,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub headline: String,
    pub image_prompt: String,
    #[serde(default)]
    pub visual_spec: VisualSpec,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub target_emotion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub post_number: u32,
    pub status: ImageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageManifestRecord {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub total_images: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

impl ImageManifestRecord {
    pub fn successes(&self) -> usize {
        self.images
            .iter()
            .filter(|entry| entry.status == ImageStatus::Success)
            .count()
    }
}
