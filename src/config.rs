use serde::{Deserialize, Serialize};

use crate::providers::{AiCapability, ProviderName};

/// Environment-driven configuration: provider credentials, screenshot API
/// settings, and per-capability provider preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub claude_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub screenshot_endpoint: Option<String>,
    pub screenshot_api_key: Option<String>,
    pub text_analysis_provider: ProviderName,
    pub text_generation_provider: ProviderName,
    pub web_analysis_provider: ProviderName,
    pub content_strategy_provider: ProviderName,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            claude_api_key: std::env::var("CLAUDE_API_KEY").ok(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            screenshot_endpoint: std::env::var("SCREENSHOT_ENDPOINT").ok(),
            screenshot_api_key: std::env::var("SCREENSHOT_API_KEY").ok(),
            text_analysis_provider: preference("AI_TEXT_ANALYSIS_PROVIDER"),
            text_generation_provider: preference("AI_TEXT_GENERATION_PROVIDER"),
            web_analysis_provider: preference("AI_WEB_ANALYSIS_PROVIDER"),
            content_strategy_provider: preference("AI_CONTENT_STRATEGY_PROVIDER"),
        }
    }

    /// The configured preference for a capability. Image generation is not
    /// configurable: it is pinned in the factory, not here.
    pub fn preferred_provider(&self, capability: AiCapability) -> ProviderName {
        match capability {
            AiCapability::TextAnalysis => self.text_analysis_provider,
            AiCapability::TextGeneration => self.text_generation_provider,
            AiCapability::WebAnalysis => self.web_analysis_provider,
            AiCapability::ContentStrategy => self.content_strategy_provider,
            AiCapability::ImageAnalysis | AiCapability::ImageGeneration => {
                self.web_analysis_provider
            }
        }
    }

    pub fn credential(&self, provider: ProviderName) -> Option<&str> {
        match provider {
            ProviderName::Claude => self.claude_api_key.as_deref(),
            ProviderName::Gemini => self.gemini_api_key.as_deref(),
            ProviderName::OpenAi => self.openai_api_key.as_deref(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            claude_api_key: None,
            gemini_api_key: None,
            openai_api_key: None,
            screenshot_endpoint: None,
            screenshot_api_key: None,
            text_analysis_provider: ProviderName::Claude,
            text_generation_provider: ProviderName::Claude,
            web_analysis_provider: ProviderName::Claude,
            content_strategy_provider: ProviderName::Claude,
        }
    }
}

fn preference(env_var: &str) -> ProviderName {
    std::env::var(env_var)
        .ok()
        .and_then(|name| ProviderName::parse(&name))
        .unwrap_or(ProviderName::Claude)
}
