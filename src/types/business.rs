use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured business intelligence extracted for one website.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessIntelRecord {
    #[serde(default)]
    pub company_overview: CompanyOverview,
    #[serde(default)]
    pub services_products: Value,
    #[serde(default)]
    pub market_analysis: Value,
    #[serde(default)]
    pub founders: Vec<Founder>,
    #[serde(default)]
    pub social_media: Vec<SocialLink>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub analysis_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    /// Whatever else the model chose to include.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyOverview {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a founder record came from. Domain inference is a weak signal and
/// must stay distinguishable from content-derived extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FounderSource {
    #[default]
    Content,
    DomainInference,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Founder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub source: FounderSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl Founder {
    /// Normalization key for dedup: lower-cased, trimmed name.
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Rough richness measure used when merging duplicate founders.
    pub fn detail_score(&self) -> usize {
        let mut score = 0;
        if !self.role.trim().is_empty() {
            score += 1;
        }
        score += self.bio.trim().len();
        if self.source == FounderSource::Content {
            // content-derived beats an equally detailed inferred record
            score += 1;
        }
        score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    pub handle: String,
}
