use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{truncate_chars, AiCapability, AiProvider, Analysis, ProviderName};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resilience::{retry, RetryPolicy};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 4000;
/// HTML slice passed per web-analysis request.
const HTML_PROMPT_CHARS: usize = 8000;

const CAPABILITIES: &[AiCapability] = &[
    AiCapability::TextAnalysis,
    AiCapability::TextGeneration,
    AiCapability::ImageAnalysis,
    AiCapability::WebAnalysis,
    AiCapability::ContentStrategy,
];

#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}

impl ClaudeProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .claude_api_key
            .clone()
            .ok_or(Error::MissingCredential {
                provider: ProviderName::Claude,
                env_var: "CLAUDE_API_KEY",
            })?;

        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn request(&self, content: Vec<ContentBlock>, system: Option<&str>) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content,
            }],
            max_tokens: MAX_TOKENS,
            system,
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(Error::Api {
                provider: ProviderName::Claude,
                status,
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| Error::MalformedResponse {
                provider: ProviderName::Claude,
                detail: "no content blocks in response".to_string(),
            })
    }

    async fn text_request(&self, prompt: String, system: Option<&str>) -> Result<String> {
        self.request(vec![ContentBlock::Text { text: prompt }], system)
            .await
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Claude
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &[AiCapability] {
        CAPABILITIES
    }

    async fn analyze_text(&self, text: &str, instructions: &str) -> Result<Analysis> {
        let prompt = format!("{instructions}\n\nText to analyze:\n{text}");
        let analysis = retry(&RetryPolicy::quick(), "claude text analysis", || {
            self.text_request(prompt.clone(), None)
        })
        .await?;

        Ok(Analysis {
            analysis,
            provider: self.name(),
            model: self.model.clone(),
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        retry(&RetryPolicy::quick(), "claude text generation", || {
            self.text_request(prompt.to_string(), None)
        })
        .await
    }

    async fn analyze_image(
        &self,
        image: &[u8],
        media_type: &str,
        instructions: &str,
    ) -> Result<String> {
        let encoded = BASE64.encode(image);
        let content = || {
            vec![
                ContentBlock::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type: media_type.to_string(),
                        data: encoded.clone(),
                    },
                },
                ContentBlock::Text {
                    text: instructions.to_string(),
                },
            ]
        };

        retry(&RetryPolicy::standard(), "claude image analysis", || {
            self.request(content(), None)
        })
        .await
    }

    async fn analyze_website(&self, html: &str, url: &str, instructions: &str) -> Result<String> {
        let prompt = format!(
            "Analyze the website content for: {url}\n\nHTML Content:\n{}\n\nReturn only the JSON analysis object, no other text.",
            truncate_chars(html, HTML_PROMPT_CHARS)
        );

        retry(&RetryPolicy::critical(), "claude website analysis", || {
            self.text_request(prompt.clone(), Some(instructions))
        })
        .await
    }

    async fn create_content_strategy(
        &self,
        business_data: &Value,
        design_data: Option<&Value>,
        instructions: &str,
    ) -> Result<String> {
        let company_name = business_data
            .pointer("/company_overview/name")
            .and_then(Value::as_str)
            .unwrap_or("Company");

        let design_block = match design_data {
            Some(data) => serde_json::to_string_pretty(data)?,
            None => "No design data provided".to_string(),
        };

        let prompt = format!(
            "Create a social media content strategy for {company_name}.\n\n\
             Business Intelligence:\n{}\n\n\
             Design Analysis:\n{}\n\n\
             Create 3 Instagram post concepts that align with the brand and resonate with their target audience.\n\n\
             IMPORTANT: Return ONLY the JSON object as specified in the system prompt. Do not include any explanatory text, markdown formatting, or other content outside of the JSON structure.",
            serde_json::to_string_pretty(business_data)?,
            design_block
        );

        retry(&RetryPolicy::quick(), "claude content strategy", || {
            self.text_request(prompt.clone(), Some(instructions))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> Config {
        Config {
            claude_api_key: Some("test-key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_construction_requires_credential() {
        let err = ClaudeProvider::new(&Config::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingCredential {
                provider: ProviderName::Claude,
                env_var: "CLAUDE_API_KEY",
            }
        ));
    }

    #[test]
    fn test_default_model_and_capabilities() {
        let provider = ClaudeProvider::new(&config_with_key()).unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert!(provider.supports(AiCapability::WebAnalysis));
        assert!(provider.supports(AiCapability::ContentStrategy));
        assert!(!provider.supports(AiCapability::ImageGeneration));
    }

    #[tokio::test]
    async fn test_unsupported_image_generation() {
        let provider = ClaudeProvider::new(&config_with_key()).unwrap();
        let err = provider.generate_image("a logo").await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedCapability {
                capability: AiCapability::ImageGeneration,
                ..
            }
        ));
    }

    #[test]
    fn test_image_block_serialization() {
        let block = ContentBlock::Image {
            source: ImageSource {
                kind: "base64",
                media_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            },
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["source"]["media_type"], "image/png");
    }
}
