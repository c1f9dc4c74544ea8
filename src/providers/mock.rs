//! Scripted provider for tests: every capability, deterministic output,
//! optional injected failures.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{AiCapability, AiProvider, Analysis, ProviderName};
use crate::error::{Error, Result};

const ALL_CAPABILITIES: &[AiCapability] = &[
    AiCapability::TextAnalysis,
    AiCapability::TextGeneration,
    AiCapability::ImageAnalysis,
    AiCapability::ImageGeneration,
    AiCapability::WebAnalysis,
    AiCapability::ContentStrategy,
];

#[derive(Debug)]
pub struct MockProvider {
    identity: ProviderName,
    model: String,
    default_response: String,
    queued: Mutex<VecDeque<Result<String>>>,
    queued_images: Mutex<VecDeque<Result<Vec<u8>>>>,
    /// Prompts seen by text-producing calls, for assertions.
    pub prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_response("{}")
    }

    /// Repeat `response` for every text-producing call unless something is
    /// queued ahead of it.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            identity: ProviderName::Claude,
            model: "mock-model".to_string(),
            default_response: response.into(),
            queued: Mutex::new(VecDeque::new()),
            queued_images: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_identity(mut self, identity: ProviderName) -> Self {
        self.identity = identity;
        self
    }

    /// Queue a one-shot response consumed before the default kicks in.
    pub fn push_response(&self, response: impl Into<String>) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: Error) {
        self.queued.lock().unwrap().push_back(Err(error));
    }

    pub fn push_image(&self, bytes: Vec<u8>) {
        self.queued_images.lock().unwrap().push_back(Ok(bytes));
    }

    pub fn push_image_error(&self, error: Error) {
        self.queued_images.lock().unwrap().push_back(Err(error));
    }

    fn next_text(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.queued.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> ProviderName {
        self.identity
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &[AiCapability] {
        ALL_CAPABILITIES
    }

    async fn analyze_text(&self, text: &str, instructions: &str) -> Result<Analysis> {
        let analysis = self.next_text(&format!("{instructions}\n{text}"))?;
        Ok(Analysis {
            analysis,
            provider: self.identity,
            model: self.model.clone(),
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.next_text(prompt)
    }

    async fn analyze_image(
        &self,
        _image: &[u8],
        _media_type: &str,
        instructions: &str,
    ) -> Result<String> {
        self.next_text(instructions)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.queued_images.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(vec![0u8; 16]),
        }
    }

    async fn analyze_website(&self, html: &str, url: &str, instructions: &str) -> Result<String> {
        self.next_text(&format!("{instructions}\n{url}\n{html}"))
    }

    async fn create_content_strategy(
        &self,
        business_data: &Value,
        _design_data: Option<&Value>,
        instructions: &str,
    ) -> Result<String> {
        self.next_text(&format!("{instructions}\n{business_data}"))
    }
}
