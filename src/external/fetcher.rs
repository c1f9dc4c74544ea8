use async_trait::async_trait;

use crate::error::Result;

/// Raw page fetch with a browser-like identity.
///
/// Blocked or failing sites must degrade to a minimal placeholder page so
/// analysis can continue, never to an error.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct ReqwestHtmlFetcher {
    client: reqwest::Client,
}

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl ReqwestHtmlFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn placeholder(url: &str, reason: &str) -> String {
        format!(
            "<html><head><title>Access Restricted</title></head>\
             <body><h1>Website: {url}</h1><p>{reason}</p></body></html>"
        )
    }
}

#[async_trait]
impl HtmlFetcher for ReqwestHtmlFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::info!("fetching content from {url}");

        let response = match self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::warn!("request failed for {url}: {err}");
                return Ok(Self::placeholder(
                    url,
                    &format!("Request failed: {err}. Analysis continues in degraded mode."),
                ));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            log::warn!("access forbidden (403) for {url}; site likely blocks automated requests");
            return Ok(Self::placeholder(
                url,
                "Access restricted - unable to fetch content due to 403 Forbidden. \
                 This website likely blocks automated requests.",
            ));
        }
        if !status.is_success() {
            log::warn!("fetch for {url} returned {status}");
            return Ok(Self::placeholder(
                url,
                &format!("Request returned status {status}."),
            ));
        }

        Ok(response.text().await?)
    }
}
