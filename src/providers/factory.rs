//! Capability-driven provider resolution.
//!
//! Image generation is pinned to Gemini's image model no matter what the
//! environment asks for; everything else follows the configured preference
//! and then a fixed per-capability priority list.

use serde::Serialize;

use super::{
    AiCapability, AiProvider, ClaudeProvider, GeminiProvider, OpenAiProvider, ProviderName,
};
use crate::config::Config;
use crate::error::{Error, Result};

/// The one model allowed to render brand images.
pub const IMAGE_GENERATION_MODEL: &str = "gemini-2.5-flash-image-preview";

pub struct ProviderFactory {
    config: Config,
}

/// Introspection row for one backend; never fails to build.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: ProviderName,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub capabilities: Vec<AiCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    /// Resolve a provider for `capability`, or `NoProviderAvailable`.
    pub fn resolve(&self, capability: AiCapability) -> Result<Box<dyn AiProvider>> {
        if capability == AiCapability::ImageGeneration {
            return GeminiProvider::new(&self.config)
                .map(|p| Box::new(p.with_model(IMAGE_GENERATION_MODEL)) as Box<dyn AiProvider>)
                .map_err(|err| {
                    log::error!("image generation requires gemini: {err}");
                    Error::NoProviderAvailable(capability)
                });
        }

        let preferred = self.config.preferred_provider(capability);
        if let Ok(provider) = self.construct(preferred) {
            if provider.supports(capability) {
                return Ok(provider);
            }
            log::warn!("configured provider {preferred} does not support {capability}");
        }

        for name in priority_order(capability) {
            match self.construct(*name) {
                Ok(provider) if provider.supports(capability) => return Ok(provider),
                _ => continue,
            }
        }

        Err(Error::NoProviderAvailable(capability))
    }

    fn construct(&self, name: ProviderName) -> Result<Box<dyn AiProvider>> {
        match name {
            ProviderName::Claude => {
                ClaudeProvider::new(&self.config).map(|p| Box::new(p) as Box<dyn AiProvider>)
            }
            ProviderName::Gemini => {
                GeminiProvider::new(&self.config).map(|p| Box::new(p) as Box<dyn AiProvider>)
            }
            ProviderName::OpenAi => {
                OpenAiProvider::new(&self.config).map(|p| Box::new(p) as Box<dyn AiProvider>)
            }
        }
    }

    /// Status of every backend without throwing on missing credentials.
    pub fn list_available(&self) -> Vec<ProviderStatus> {
        ProviderName::ALL
            .iter()
            .map(|name| match self.construct(*name) {
                Ok(provider) => ProviderStatus {
                    name: *name,
                    configured: true,
                    model: Some(provider.model().to_string()),
                    capabilities: provider.capabilities().to_vec(),
                    error: None,
                },
                Err(err) => ProviderStatus {
                    name: *name,
                    configured: false,
                    model: None,
                    capabilities: Vec::new(),
                    error: Some(err.to_string()),
                },
            })
            .collect()
    }
}

fn priority_order(capability: AiCapability) -> &'static [ProviderName] {
    match capability {
        AiCapability::TextAnalysis | AiCapability::TextGeneration | AiCapability::ImageAnalysis => {
            &[ProviderName::Claude, ProviderName::OpenAi, ProviderName::Gemini]
        }
        AiCapability::WebAnalysis | AiCapability::ContentStrategy => {
            &[ProviderName::Claude, ProviderName::OpenAi]
        }
        AiCapability::ImageGeneration => &[ProviderName::Gemini],
    }
}
