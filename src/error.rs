use thiserror::Error;

use crate::providers::{AiCapability, ProviderName};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{provider} does not support {capability}")]
    UnsupportedCapability {
        provider: ProviderName,
        capability: AiCapability,
    },

    #[error("no available provider found for capability: {0}")]
    NoProviderAvailable(AiCapability),

    #[error("{env_var} environment variable not set (required by {provider})")]
    MissingCredential {
        provider: ProviderName,
        env_var: &'static str,
    },

    #[error("exhausted {attempts} retry attempts for {label}: {source}")]
    RetriesExhausted {
        label: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("instruction template '{0}' not found and no fallback is permitted")]
    RequiredTemplateMissing(String),

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: ProviderName,
        status: u16,
        body: String,
    },

    #[error("unexpected {provider} response: {detail}")]
    MalformedResponse {
        provider: ProviderName,
        detail: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
