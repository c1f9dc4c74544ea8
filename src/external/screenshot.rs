use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Error, Result};

/// Mobile-first full-page capture defaults.
#[derive(Debug, Clone)]
pub struct ViewportSpec {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: u32,
    pub full_page: bool,
    pub block_cookie_banners: bool,
    pub block_ads: bool,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: 375,
            height: 812,
            device_scale_factor: 2,
            full_page: true,
            block_cookie_banners: true,
            block_ads: true,
        }
    }
}

/// Full-page PNG capture of a rendered website.
#[async_trait]
pub trait ScreenshotClient: Send + Sync {
    async fn capture(&self, url: &str, viewport: &ViewportSpec) -> Result<Vec<u8>>;
}

/// ScreenshotOne-style HTTP API client.
pub struct ScreenshotApiClient {
    endpoint: String,
    access_key: String,
    client: reqwest::Client,
}

impl ScreenshotApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config.screenshot_endpoint.clone().ok_or_else(|| {
            Error::InvalidInput("SCREENSHOT_ENDPOINT environment variable not set".to_string())
        })?;
        let access_key = config.screenshot_api_key.clone().ok_or_else(|| {
            Error::InvalidInput("SCREENSHOT_API_KEY environment variable not set".to_string())
        })?;

        // full-page renders of long sites take a while
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            endpoint,
            access_key,
            client,
        })
    }
}

#[async_trait]
impl ScreenshotClient for ScreenshotApiClient {
    async fn capture(&self, url: &str, viewport: &ViewportSpec) -> Result<Vec<u8>> {
        log::info!("capturing screenshot for {url}");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", url),
                ("access_key", &self.access_key),
                ("format", "png"),
                ("viewport_width", &viewport.width.to_string()),
                ("viewport_height", &viewport.height.to_string()),
                (
                    "device_scale_factor",
                    &viewport.device_scale_factor.to_string(),
                ),
                ("full_page", &viewport.full_page.to_string()),
                (
                    "block_cookie_banners",
                    &viewport.block_cookie_banners.to_string(),
                ),
                ("block_ads", &viewport.block_ads.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(Error::InvalidInput(format!(
                "screenshot capture failed with status {status}: {body}"
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(Error::InvalidInput(
                "screenshot API returned an empty image".to_string(),
            ));
        }

        log::info!("screenshot captured, {} bytes", bytes.len());
        Ok(bytes)
    }
}

/// Stand-in when no screenshot API is configured; every capture fails so
/// the design agent falls back to markup tokens and defaults.
pub struct DisabledScreenshot;

#[async_trait]
impl ScreenshotClient for DisabledScreenshot {
    async fn capture(&self, url: &str, _viewport: &ViewportSpec) -> Result<Vec<u8>> {
        Err(Error::InvalidInput(format!(
            "screenshot capture disabled; no API configured (requested {url})"
        )))
    }
}
