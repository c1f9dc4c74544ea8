use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{truncate_chars, AiCapability, AiProvider, Analysis, ProviderName};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resilience::{retry, RetryPolicy};

const API_ROOT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const IMAGE_MODEL: &str = "dall-e-3";
const MAX_TOKENS: u32 = 4000;
const HTML_PROMPT_CHARS: usize = 8000;

const CAPABILITIES: &[AiCapability] = &[
    AiCapability::TextAnalysis,
    AiCapability::TextGeneration,
    AiCapability::ImageGeneration,
    AiCapability::WebAnalysis,
    AiCapability::ContentStrategy,
];

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: String,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or(Error::MissingCredential {
                provider: ProviderName::OpenAi,
                env_var: "OPENAI_API_KEY",
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

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{API_ROOT}/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(Error::Api {
                provider: ProviderName::OpenAi,
                status,
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::MalformedResponse {
                provider: ProviderName::OpenAi,
                detail: "no choices in response".to_string(),
            })
    }

    fn user_message(content: String) -> ChatMessage {
        ChatMessage {
            role: "user".to_string(),
            content,
        }
    }

    fn system_message(content: &str) -> ChatMessage {
        ChatMessage {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &[AiCapability] {
        CAPABILITIES
    }

    async fn analyze_text(&self, text: &str, instructions: &str) -> Result<Analysis> {
        let messages = || {
            vec![
                Self::system_message("You are an expert text analyst."),
                Self::user_message(format!("{instructions}\n\nText to analyze:\n{text}")),
            ]
        };

        let analysis = retry(&RetryPolicy::quick(), "openai text analysis", || {
            self.chat(messages())
        })
        .await?;

        Ok(Analysis {
            analysis,
            provider: self.name(),
            model: self.model.clone(),
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        retry(&RetryPolicy::quick(), "openai text generation", || {
            self.chat(vec![Self::user_message(prompt.to_string())])
        })
        .await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let send = || async {
            let request = ImageRequest {
                model: IMAGE_MODEL,
                prompt,
                size: "1024x1024",
                quality: "standard",
                response_format: "b64_json",
            };

            let response = self
                .client
                .post(format!("{API_ROOT}/images/generations"))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await?;
                return Err(Error::Api {
                    provider: ProviderName::OpenAi,
                    status,
                    body,
                });
            }

            Ok(response.json::<ImageResponse>().await?)
        };

        let parsed = retry(&RetryPolicy::standard(), "openai image generation", send).await?;

        let datum = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse {
                provider: ProviderName::OpenAi,
                detail: "no image data in response".to_string(),
            })?;

        BASE64
            .decode(datum.b64_json.as_bytes())
            .map_err(|e| Error::MalformedResponse {
                provider: ProviderName::OpenAi,
                detail: format!("invalid base64 image data: {e}"),
            })
    }

    async fn analyze_website(&self, html: &str, url: &str, instructions: &str) -> Result<String> {
        let messages = || {
            vec![
                Self::system_message(instructions),
                Self::user_message(format!(
                    "Analyze this website for: {url}\n\nHTML Content:\n{}\n\nReturn only the JSON analysis object, no other text.",
                    truncate_chars(html, HTML_PROMPT_CHARS)
                )),
            ]
        };

        retry(&RetryPolicy::critical(), "openai website analysis", || {
            self.chat(messages())
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
             IMPORTANT: Return ONLY the JSON object. No explanatory text outside the JSON structure.",
            serde_json::to_string_pretty(business_data)?,
            design_block
        );

        let messages = || {
            vec![
                Self::system_message(instructions),
                Self::user_message(prompt.clone()),
            ]
        };

        retry(&RetryPolicy::quick(), "openai content strategy", || {
            self.chat(messages())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> Config {
        Config {
            openai_api_key: Some("test-key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_construction_requires_credential() {
        assert!(matches!(
            OpenAiProvider::new(&Config::default()).unwrap_err(),
            Error::MissingCredential {
                provider: ProviderName::OpenAi,
                ..
            }
        ));
    }

    #[test]
    fn test_default_model_and_capabilities() {
        let provider = OpenAiProvider::new(&config_with_key()).unwrap();
        assert_eq!(provider.model(), "gpt-4o");
        assert!(provider.supports(AiCapability::WebAnalysis));
        assert!(provider.supports(AiCapability::ImageGeneration));
        assert!(!provider.supports(AiCapability::ImageAnalysis));
    }

    #[tokio::test]
    async fn test_unsupported_image_analysis() {
        let provider = OpenAiProvider::new(&config_with_key()).unwrap();
        let err = provider
            .analyze_image(&[0u8; 4], "image/png", "look")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedCapability {
                capability: AiCapability::ImageAnalysis,
                ..
            }
        ));
    }
}
