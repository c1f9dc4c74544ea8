//! Phase 1: business intelligence extraction.

use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value};

use crate::agents::{about, extract_social_links, host_of, today};
use crate::error::Result;
use crate::external::{HtmlFetcher, InstructionStore};
use crate::html;
use crate::providers::AiProvider;
use crate::resilience::{recover_json, Recovered};
use crate::types::{BusinessIntelRecord, CompanyOverview, Founder, FounderSource};

/// Visible-text budget handed to the model.
const PAGE_TEXT_CHARS: usize = 16_000;

const ANALYZER_TEMPLATE: &str = "business_intelligence_analyzer";
const FOUNDER_TEMPLATE: &str = "founder_extractor";

pub struct BusinessIntelAgent {
    provider: Arc<dyn AiProvider>,
    fetcher: Arc<dyn HtmlFetcher>,
    instructions: Arc<dyn InstructionStore>,
}

impl BusinessIntelAgent {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        fetcher: Arc<dyn HtmlFetcher>,
        instructions: Arc<dyn InstructionStore>,
    ) -> Self {
        Self {
            provider,
            fetcher,
            instructions,
        }
    }

    /// Fetch, analyze and enrich. Never returns an empty record: the AI
    /// path degrades to rule-based extraction, founder and social-link
    /// enrichment are best-effort on top.
    pub async fn analyze(&self, url: &str) -> Result<BusinessIntelRecord> {
        let homepage = self.fetcher.fetch(url).await?;
        let mut record = self.extract_business_info(&homepage, url).await;

        let discovery = about::discover(url, &homepage);
        let mut founders = if discovery.spa_degraded {
            Vec::new()
        } else {
            self.extract_founders(&discovery.candidates).await
        };
        if founders.is_empty() {
            if let Some(inferred) = founder_from_domain(url) {
                founders.push(inferred);
            }
        }
        // AI extraction may already have produced founders; merge all sources
        let mut all = std::mem::take(&mut record.founders);
        all.extend(founders);
        record.founders = merge_founders(all);

        record.social_media = extract_social_links(&homepage);

        record.url = url.to_string();
        record.timestamp = today();
        record.ai_provider = Some(self.provider.name().to_string());
        record.ai_model = Some(self.provider.model().to_string());

        Ok(record)
    }

    async fn extract_business_info(&self, homepage: &str, url: &str) -> BusinessIntelRecord {
        let template = match self.instructions.require(ANALYZER_TEMPLATE) {
            Ok(template) => template,
            Err(err) => {
                log::warn!("{err}; falling back to basic extraction");
                return basic_extraction(homepage, url);
            }
        };

        let page = page_summary(homepage, url);
        let response = match self.provider.analyze_website(&page, url, &template).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("AI analysis failed ({err}); falling back to basic extraction");
                return basic_extraction(homepage, url);
            }
        };

        match recover_json(&response) {
            Recovered::Parsed(value) => match serde_json::from_value::<BusinessIntelRecord>(value) {
                Ok(mut record) => {
                    record.analysis_method = "ai_enhanced".to_string();
                    record
                }
                Err(err) => {
                    log::warn!("AI record did not deserialize ({err}); using basic extraction");
                    basic_extraction(homepage, url)
                }
            },
            Recovered::Fallback { .. } => {
                log::warn!("AI response could not be parsed as JSON; using basic extraction");
                basic_extraction(homepage, url)
            }
        }
    }

    /// Up to one founder per candidate page, via the dedicated template.
    async fn extract_founders(&self, candidates: &[about::AboutCandidate]) -> Vec<Founder> {
        let template = match self.instructions.load(FOUNDER_TEMPLATE) {
            Ok(Some(template)) => template,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("could not load founder template: {err}");
                return Vec::new();
            }
        };

        let mut founders = Vec::new();
        for candidate in candidates {
            let page_html = match self.fetcher.fetch(&candidate.url).await {
                Ok(html) => html,
                Err(err) => {
                    log::warn!("could not fetch {}: {err}", candidate.url);
                    continue;
                }
            };
            let text = html::visible_text(&page_html, PAGE_TEXT_CHARS);
            if text.is_empty() {
                continue;
            }

            let response = match self
                .provider
                .analyze_website(&text, &candidate.url, &template)
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    log::warn!("founder extraction failed for {}: {err}", candidate.url);
                    continue;
                }
            };

            if let Some(mut founder) = parse_founder(&response) {
                founder.source = FounderSource::Content;
                founder.page_url = Some(candidate.url.clone());
                founders.push(founder);
            }
        }

        founders
    }
}

fn page_summary(homepage: &str, url: &str) -> String {
    let title = html::extract_title(homepage).unwrap_or_default();
    let description = html::extract_meta_description(homepage).unwrap_or_default();
    let text = html::visible_text(homepage, PAGE_TEXT_CHARS);
    format!("URL: {url}\nTitle: {title}\nMeta description: {description}\n\nPage text:\n{text}")
}

/// Rule-based extraction from headings and paragraphs when the AI path is
/// unavailable or unparseable.
fn basic_extraction(homepage: &str, url: &str) -> BusinessIntelRecord {
    let title = html::extract_title(homepage).unwrap_or_default();
    let description = html::extract_meta_description(homepage).unwrap_or_default();

    let name = title
        .split(" - ")
        .next()
        .unwrap_or(&title)
        .trim()
        .to_string();

    let headings: Vec<Value> = Regex::new(r"(?is)<(h[1-3])[^>]*>(.*?)</h[1-3]>")
        .unwrap()
        .captures_iter(homepage)
        .take(5)
        .map(|c| {
            json!({
                "tag": c[1].to_lowercase(),
                "text": html::visible_text(&c[2], 200),
            })
        })
        .collect();

    let paragraphs: Vec<String> = Regex::new(r"(?is)<p[^>]*>(.*?)</p>")
        .unwrap()
        .captures_iter(homepage)
        .map(|c| html::visible_text(&c[1], 500))
        .filter(|t| !t.is_empty())
        .take(3)
        .collect();

    let mut record = BusinessIntelRecord {
        company_overview: CompanyOverview {
            name,
            website_title: title,
            description,
            industry: "Technology".to_string(),
            location: "Unknown".to_string(),
            ..CompanyOverview::default()
        },
        services_products: json!({
            "primary_services": [],
            "key_products": [],
            "target_market": "B2B/B2C",
        }),
        market_analysis: json!({
            "positioning": "Professional",
            "competitive_advantages": [],
            "target_audience": "Business professionals",
        }),
        url: url.to_string(),
        analysis_method: "basic_extraction".to_string(),
        ..BusinessIntelRecord::default()
    };
    record.extra.insert(
        "content_analysis".to_string(),
        json!({
            "main_headings": headings,
            "key_paragraphs": paragraphs,
        }),
    );
    record
}

/// Pull a single founder out of a model response. Accepts either a bare
/// founder object or one nested under a `founder` key.
fn parse_founder(response: &str) -> Option<Founder> {
    let value = match recover_json(response) {
        Recovered::Parsed(value) => value,
        Recovered::Fallback { .. } => return None,
    };

    let founder_value = value.get("founder").cloned().unwrap_or(value);
    let founder: Founder = serde_json::from_value(founder_value).ok()?;
    if founder.name.trim().is_empty() {
        return None;
    }
    Some(founder)
}

/// Infer a founder identity from the domain label alone. A weak signal for
/// personal-brand sites (`janedoe.com`); tagged so consumers can discount it.
fn founder_from_domain(url: &str) -> Option<Founder> {
    let host = host_of(url);
    let label = host.split('.').next()?;
    if label.len() < 5 || label.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let name = label
        .split('-')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        return None;
    }

    Some(Founder {
        name,
        role: "Founder".to_string(),
        bio: String::new(),
        source: FounderSource::DomainInference,
        page_url: None,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Merge founder lists from multiple extraction passes. Deduplicated by
/// lower-cased trimmed name; the more detailed record wins, missing fields
/// are filled from the other source.
pub fn merge_founders(founders: Vec<Founder>) -> Vec<Founder> {
    let mut merged: Vec<Founder> = Vec::new();

    for founder in founders {
        if founder.name.trim().is_empty() {
            continue;
        }
        let key = founder.normalized_name();
        match merged.iter_mut().find(|f| f.normalized_name() == key) {
            Some(existing) => {
                let (primary, secondary) = if founder.detail_score() > existing.detail_score() {
                    (founder, existing.clone())
                } else {
                    (existing.clone(), founder)
                };
                let mut combined = primary;
                if combined.role.trim().is_empty() {
                    combined.role = secondary.role;
                }
                if combined.bio.trim().is_empty() {
                    combined.bio = secondary.bio;
                }
                if combined.page_url.is_none() {
                    combined.page_url = secondary.page_url;
                }
                *existing = combined;
            }
            None => merged.push(founder),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::FsInstructionStore;
    use crate::providers::MockProvider;
    use async_trait::async_trait;

    struct FixedFetcher(String);

    #[async_trait]
    impl HtmlFetcher for FixedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn founder(name: &str, role: &str, bio: &str) -> Founder {
        Founder {
            name: name.to_string(),
            role: role.to_string(),
            bio: bio.to_string(),
            source: FounderSource::Content,
            page_url: None,
        }
    }

    #[test]
    fn test_merge_founders_deduplicates_case_insensitively() {
        let merged = merge_founders(vec![
            founder("Jane Doe", "", ""),
            founder("John Smith", "", ""),
            founder("jane doe", "", "Started the company in 2012."),
            founder("Alice", "", ""),
        ]);

        assert_eq!(merged.len(), 3);
        let jane = merged
            .iter()
            .find(|f| f.normalized_name() == "jane doe")
            .unwrap();
        assert_eq!(jane.bio, "Started the company in 2012.");
    }

    #[test]
    fn test_merge_fills_missing_fields_from_weaker_source() {
        let merged = merge_founders(vec![
            founder("Jane Doe", "CEO", ""),
            founder("JANE DOE", "", "A long and detailed biography."),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].role, "CEO");
        assert_eq!(merged[0].bio, "A long and detailed biography.");
    }

    #[test]
    fn test_content_beats_domain_inference_on_ties() {
        let mut inferred = founder("Jane Doe", "Founder", "");
        inferred.source = FounderSource::DomainInference;
        let from_content = founder("jane doe", "Founder", "");

        let merged = merge_founders(vec![inferred, from_content]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, FounderSource::Content);
    }

    #[test]
    fn test_founder_from_domain() {
        let founder = founder_from_domain("https://www.jane-doe.com").unwrap();
        assert_eq!(founder.name, "Jane Doe");
        assert_eq!(founder.source, FounderSource::DomainInference);

        // short or numeric labels are not names
        assert!(founder_from_domain("https://ab.io").is_none());
        assert!(founder_from_domain("https://shop24.com").is_none());
    }

    #[test]
    fn test_parse_founder_variants() {
        let bare = r#"{"name": "Jane Doe", "role": "CEO", "bio": "Builder."}"#;
        assert_eq!(parse_founder(bare).unwrap().name, "Jane Doe");

        let nested = r#"{"founder": {"name": "John Smith", "role": "CTO"}}"#;
        assert_eq!(parse_founder(nested).unwrap().name, "John Smith");

        assert!(parse_founder("no structure here").is_none());
        assert!(parse_founder(r#"{"name": "  "}"#).is_none());
    }

    #[test]
    fn test_basic_extraction_never_empty() {
        let html = r#"<html><head><title>Acme Co - Widgets</title>
            <meta name="description" content="We make widgets."></head>
            <body><h1>Widgets for all</h1><p>Since 1998 we build widgets.</p></body></html>"#;
        let record = basic_extraction(html, "https://acme.com");
        assert_eq!(record.company_overview.name, "Acme Co");
        assert_eq!(record.company_overview.description, "We make widgets.");
        assert_eq!(record.analysis_method, "basic_extraction");
        assert!(record.extra.contains_key("content_analysis"));
    }

    #[tokio::test]
    async fn test_analyze_with_ai_record() {
        let homepage = r#"<html><head><title>Example Co - Home</title></head><body>
            <p>Example Co builds excellent example things for exemplary people everywhere,
            every single day of the year, with care and precision.</p>
            <a href="https://www.facebook.com/pages/ExampleCo">Facebook</a>
        </body></html>"#;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("business_intelligence_analyzer.md"),
            "Extract business intelligence as JSON.",
        )
        .unwrap();

        let provider = Arc::new(MockProvider::with_response(
            r#"{"company_overview": {"name": "Example Co", "industry": "Software"}}"#,
        ));
        let agent = BusinessIntelAgent::new(
            provider,
            Arc::new(FixedFetcher(homepage.to_string())),
            Arc::new(FsInstructionStore::new(dir.path())),
        );

        let record = agent.analyze("https://example.com").await.unwrap();
        assert_eq!(record.company_overview.name, "Example Co");
        assert_eq!(record.analysis_method, "ai_enhanced");
        assert_eq!(record.url, "https://example.com");
        assert_eq!(record.social_media.len(), 1);
        assert_eq!(record.social_media[0].handle, "ExampleCo");
    }

    #[tokio::test]
    async fn test_analyze_degrades_without_template() {
        let homepage = "<html><head><title>Acme</title></head><body><p>hello world</p></body></html>";
        let dir = tempfile::tempdir().unwrap();

        let agent = BusinessIntelAgent::new(
            Arc::new(MockProvider::new()),
            Arc::new(FixedFetcher(homepage.to_string())),
            Arc::new(FsInstructionStore::new(dir.path())),
        );

        let record = agent.analyze("https://acme.com").await.unwrap();
        assert_eq!(record.analysis_method, "basic_extraction");
    }
}
