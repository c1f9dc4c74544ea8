use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A previously published social post, used as a language/tone signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
}

/// Optional auxiliary signal source. Implementations scrape a social
/// profile; absence must degrade gracefully (English, no special tone).
#[async_trait]
pub trait SocialFeed: Send + Sync {
    async fn recent_posts(&self, profile_url: &str, count: usize) -> Result<Vec<SocialPost>>;
}

/// The no-signal default.
pub struct NoSocialFeed;

#[async_trait]
impl SocialFeed for NoSocialFeed {
    async fn recent_posts(&self, _profile_url: &str, _count: usize) -> Result<Vec<SocialPost>> {
        Ok(Vec::new())
    }
}
