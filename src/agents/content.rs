//! Phase 3: social content strategy.
//!
//! This phase feeds both downstream phases, so unlike the analysis agents
//! it fails loudly: an unusable model response is an error, never a
//! silently degraded record.

use std::sync::Arc;

use crate::agents::today;
use crate::error::{Error, Result};
use crate::external::{InstructionStore, SocialFeed};
use crate::lang;
use crate::providers::AiProvider;
use crate::resilience::{recover_json, Recovered};
use crate::types::{BusinessIntelRecord, ContentStrategyRecord, DesignTokenRecord};

/// Posts requested per strategy.
pub const POSTS_PER_RUN: usize = 3;
/// Prior posts sampled for language detection.
const FEED_SAMPLE: usize = 5;

const STRATEGIST_TEMPLATE: &str = "social_content_creator";

pub struct SocialContentAgent {
    provider: Arc<dyn AiProvider>,
    instructions: Arc<dyn InstructionStore>,
    social_feed: Arc<dyn SocialFeed>,
}

impl SocialContentAgent {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        instructions: Arc<dyn InstructionStore>,
        social_feed: Arc<dyn SocialFeed>,
    ) -> Self {
        Self {
            provider,
            instructions,
            social_feed,
        }
    }

    pub async fn create_strategy(
        &self,
        url: &str,
        business: &BusinessIntelRecord,
        design: &DesignTokenRecord,
    ) -> Result<ContentStrategyRecord> {
        let template = self.instructions.require(STRATEGIST_TEMPLATE)?;

        let language = self.detect_brand_language(business).await;
        let instructions = if language.code == "en" {
            template
        } else {
            format!(
                "{template}\n\nIMPORTANT: The brand communicates in {}. \
                 Write every headline, subtext and call to action in {}.",
                language.name, language.name
            )
        };

        let business_value = serde_json::to_value(business)?;
        let design_value = serde_json::to_value(design)?;

        let response = self
            .provider
            .create_content_strategy(&business_value, Some(&design_value), &instructions)
            .await?;

        let value = match recover_json(&response) {
            Recovered::Parsed(value) => value,
            Recovered::Fallback { .. } => {
                return Err(Error::InvalidInput(
                    "content strategy response could not be parsed as JSON".to_string(),
                ));
            }
        };

        let mut record: ContentStrategyRecord = serde_json::from_value(value)?;
        validate_posts(&record)?;

        if record.company_name.trim().is_empty() {
            record.company_name = business.company_overview.name.clone();
        }
        record.language = language.code.to_string();
        record.url = url.to_string();
        record.timestamp = today();
        record.ai_provider = Some(self.provider.name().to_string());
        record.ai_model = Some(self.provider.model().to_string());
        Ok(record)
    }

    /// Sample the brand's prior posts (when a feed and a profile exist) and
    /// detect the caption language. Defaults to English.
    async fn detect_brand_language(
        &self,
        business: &BusinessIntelRecord,
    ) -> &'static lang::LanguageProfile {
        let Some(profile) = business
            .social_media
            .iter()
            .find(|link| link.platform == "Facebook" || link.platform == "Instagram")
        else {
            return lang::detect_language("");
        };

        match self.social_feed.recent_posts(&profile.url, FEED_SAMPLE).await {
            Ok(posts) if !posts.is_empty() => {
                let corpus: String = posts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let detected = lang::detect_language(&corpus);
                log::info!("detected caption language: {}", detected.name);
                detected
            }
            Ok(_) => lang::detect_language(""),
            Err(err) => {
                log::warn!("social feed unavailable ({err}); defaulting to English");
                lang::detect_language("")
            }
        }
    }
}

/// The strategy must carry exactly one post per thematic slot, numbered
/// 1..=N with no gaps.
fn validate_posts(record: &ContentStrategyRecord) -> Result<()> {
    let posts = &record.instagram_posts;
    if posts.len() != POSTS_PER_RUN {
        return Err(Error::InvalidInput(format!(
            "content strategy produced {} posts, expected {POSTS_PER_RUN}",
            posts.len()
        )));
    }
    for (index, post) in posts.iter().enumerate() {
        let expected = index as u32 + 1;
        if post.post_number != expected {
            return Err(Error::InvalidInput(format!(
                "post_number {} out of sequence at slot {expected}",
                post.post_number
            )));
        }
        if post.headline.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "post {expected} has an empty headline"
            )));
        }
    }
    Ok(())
}
