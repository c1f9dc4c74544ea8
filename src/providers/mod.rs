pub mod claude;
pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use claude::ClaudeProvider;
pub use factory::{ProviderFactory, ProviderStatus, IMAGE_GENERATION_MODEL};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The closed set of AI operations a provider can offer. Drives provider
/// selection and guards every call against unsupported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiCapability {
    TextAnalysis,
    TextGeneration,
    ImageAnalysis,
    ImageGeneration,
    WebAnalysis,
    ContentStrategy,
}

impl AiCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiCapability::TextAnalysis => "text_analysis",
            AiCapability::TextGeneration => "text_generation",
            AiCapability::ImageAnalysis => "image_analysis",
            AiCapability::ImageGeneration => "image_generation",
            AiCapability::WebAnalysis => "web_analysis",
            AiCapability::ContentStrategy => "content_strategy",
        }
    }
}

impl std::fmt::Display for AiCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of concrete backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Claude,
    Gemini,
    OpenAi,
}

impl ProviderName {
    pub const ALL: [ProviderName; 3] =
        [ProviderName::Claude, ProviderName::Gemini, ProviderName::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Claude => "claude",
            ProviderName::Gemini => "gemini",
            ProviderName::OpenAi => "openai",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "claude" => Some(ProviderName::Claude),
            "gemini" => Some(ProviderName::Gemini),
            "openai" => Some(ProviderName::OpenAi),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a text analysis call, tagged with the backend that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis: String,
    pub provider: ProviderName,
    pub model: String,
}

/// One AI backend bound to a vendor and model.
///
/// Operations outside a provider's capability set fail with
/// `UnsupportedCapability` — never a silent no-op. Structured-output calls
/// (`analyze_website`, `create_content_strategy`) return the raw model
/// text; JSON recovery is the caller's job.
#[async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> ProviderName;
    fn model(&self) -> &str;
    fn capabilities(&self) -> &[AiCapability];

    fn supports(&self, capability: AiCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn unsupported(&self, capability: AiCapability) -> Error {
        Error::UnsupportedCapability {
            provider: self.name(),
            capability,
        }
    }

    async fn analyze_text(&self, text: &str, instructions: &str) -> Result<Analysis>;

    async fn generate_text(&self, prompt: &str) -> Result<String>;

    async fn analyze_image(
        &self,
        _image: &[u8],
        _media_type: &str,
        _instructions: &str,
    ) -> Result<String> {
        Err(self.unsupported(AiCapability::ImageAnalysis))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>> {
        Err(self.unsupported(AiCapability::ImageGeneration))
    }

    async fn analyze_website(
        &self,
        _html: &str,
        _url: &str,
        _instructions: &str,
    ) -> Result<String> {
        Err(self.unsupported(AiCapability::WebAnalysis))
    }

    async fn create_content_strategy(
        &self,
        _business_data: &Value,
        _design_data: Option<&Value>,
        _instructions: &str,
    ) -> Result<String> {
        Err(self.unsupported(AiCapability::ContentStrategy))
    }
}

/// Truncate a prompt payload on a char boundary. Provider context windows
/// are budgeted in characters here, as the upstream prompts are.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
