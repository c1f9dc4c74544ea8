use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::{AiCapability, AiProvider, Analysis, ProviderName};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resilience::{retry, RetryPolicy};

const API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

const CAPABILITIES: &[AiCapability] = &[
    AiCapability::TextAnalysis,
    AiCapability::TextGeneration,
    AiCapability::ImageAnalysis,
    AiCapability::ImageGeneration,
];

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

impl GeminiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(Error::MissingCredential {
                provider: ProviderName::Gemini,
                env_var: "GEMINI_API_KEY",
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

    fn endpoint(&self, model: &str) -> String {
        format!("{API_ROOT}/{model}:generateContent")
    }

    async fn request(&self, model: &str, parts: Vec<Part>) -> Result<GenerateResponse> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(Error::Api {
                provider: ProviderName::Gemini,
                status,
                body,
            });
        }

        Ok(response.json().await?)
    }

    fn first_text(response: GenerateResponse) -> Result<String> {
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| Error::MalformedResponse {
                provider: ProviderName::Gemini,
                detail: "no text part in response".to_string(),
            })
    }

    async fn text_request(&self, prompt: &str) -> Result<String> {
        let response = self
            .request(TEXT_MODEL, vec![Part::Text(prompt.to_string())])
            .await?;
        Self::first_text(response)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &[AiCapability] {
        CAPABILITIES
    }

    async fn analyze_text(&self, text: &str, instructions: &str) -> Result<Analysis> {
        let prompt = format!("{instructions}\n\nText to analyze:\n{text}");
        let analysis = retry(&RetryPolicy::quick(), "gemini text analysis", || {
            self.text_request(&prompt)
        })
        .await?;

        Ok(Analysis {
            analysis,
            provider: self.name(),
            model: self.model.clone(),
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        retry(&RetryPolicy::quick(), "gemini text generation", || {
            self.text_request(prompt)
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
        let parts = || {
            vec![
                Part::Text(instructions.to_string()),
                Part::InlineData(InlineData {
                    mime_type: media_type.to_string(),
                    data: encoded.clone(),
                }),
            ]
        };

        let response = retry(&RetryPolicy::standard(), "gemini image analysis", || {
            self.request(&self.model, parts())
        })
        .await?;

        Self::first_text(response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let response = retry(&RetryPolicy::standard(), "gemini image generation", || {
            self.request(&self.model, vec![Part::Text(prompt.to_string())])
        })
        .await?;

        let inline = response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| Error::MalformedResponse {
                provider: ProviderName::Gemini,
                detail: "no image data in response".to_string(),
            })?;

        BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| Error::MalformedResponse {
                provider: ProviderName::Gemini,
                detail: format!("invalid base64 image data: {e}"),
            })
    }
}
