//! Phase 4: image-generation prompt synthesis.
//!
//! Prompts are synthesized deterministically from the content strategy and
//! the extracted design tokens. The real hex codes and font names go into
//! the prompt text verbatim — a prompt with placeholder tokens would
//! produce off-brand imagery.

use crate::error::{Error, Result};
use crate::types::{ContentStrategyRecord, DesignTokenRecord, PromptRecord, VisualSpec};

pub struct PromptAgent;

impl PromptAgent {
    pub fn new() -> Self {
        Self
    }

    /// One prompt per post, in `post_number` order.
    pub fn generate_prompts(
        &self,
        url: &str,
        strategy: &ContentStrategyRecord,
        design: &DesignTokenRecord,
    ) -> Result<Vec<PromptRecord>> {
        if strategy.instagram_posts.is_empty() {
            return Err(Error::InvalidInput(
                "content strategy has no instagram posts".to_string(),
            ));
        }

        let spec = VisualSpec {
            colors: design.palette(),
            fonts: design.font_names(),
            alignment: design.composition.alignment.clone(),
        };

        let mut posts = strategy.instagram_posts.clone();
        posts.sort_by_key(|post| post.post_number);

        let records = posts
            .iter()
            .map(|post| {
                let image_prompt = compose_prompt(url, strategy, design, &spec, post);
                PromptRecord {
                    post_number: post.post_number,
                    concept: post.concept.clone(),
                    headline: post.headline.clone(),
                    image_prompt,
                    visual_spec: spec.clone(),
                    content_type: post.content_type.clone(),
                    target_emotion: post.target_emotion.clone(),
                }
            })
            .collect();

        Ok(records)
    }
}

impl Default for PromptAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn compose_prompt(
    url: &str,
    strategy: &ContentStrategyRecord,
    design: &DesignTokenRecord,
    spec: &VisualSpec,
    post: &crate::types::InstagramPost,
) -> String {
    let kit = &design.color_kit;
    let company = if strategy.company_name.trim().is_empty() {
        url
    } else {
        &strategy.company_name
    };

    let mut prompt = format!(
        "Create a professional 1080x1080 Instagram post image for {company}.\n"
    );

    prompt.push_str(&format!(
        "Background color {} with {} as the dominant brand color.",
        kit.background.hex, kit.brand_primary.hex
    ));
    if !spec.colors.is_empty() {
        prompt.push_str(&format!(
            " Use only this exact brand palette: {}.",
            spec.colors.join(", ")
        ));
    }
    prompt.push('\n');

    if spec.fonts.is_empty() {
        prompt.push_str(&format!(
            "Typography: clean {} lettering.\n",
            if design.typography_kit.classification.is_empty() {
                "sans-serif"
            } else {
                &design.typography_kit.classification
            }
        ));
    } else {
        prompt.push_str(&format!(
            "Typography: {} (or a close match), text color {}.\n",
            spec.fonts.join(" / "),
            kit.text_primary.hex
        ));
    }

    prompt.push_str(&format!("Headline text: \"{}\".\n", post.headline));
    if !post.subtext.trim().is_empty() {
        prompt.push_str(&format!("Supporting text: \"{}\".\n", post.subtext));
    }
    if !post.call_to_action.trim().is_empty() {
        prompt.push_str(&format!(
            "Call to action button: \"{}\" in {}.\n",
            post.call_to_action, kit.brand_primary.hex
        ));
    }

    if !post.content_type.trim().is_empty() {
        prompt.push_str(&format!("Style: {} content", post.content_type));
        if !post.target_emotion.trim().is_empty() {
            prompt.push_str(&format!(", evoking {}", post.target_emotion));
        }
        prompt.push_str(".\n");
    }

    if !spec.alignment.trim().is_empty() {
        prompt.push_str(&format!("Layout: {}-aligned composition.", spec.alignment));
    }

    prompt.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorSwatch, FontFamily, InstagramPost};

    fn design_with_brand(hex: &str) -> DesignTokenRecord {
        let mut design = DesignTokenRecord::neutral_defaults("https://example.com");
        design.color_kit.brand_primary = ColorSwatch::new(hex, "buttons");
        design.typography_kit.likely_families = vec![FontFamily {
            name: "Inter".to_string(),
            confidence: 0.9,
        }];
        design.composition.alignment = "center".to_string();
        design
    }

    fn strategy_with_posts(count: u32) -> ContentStrategyRecord {
        let mut strategy = ContentStrategyRecord {
            company_name: "Example Co".to_string(),
            ..ContentStrategyRecord::default()
        };
        for n in 1..=count {
            strategy.instagram_posts.push(InstagramPost {
                post_number: n,
                headline: format!("Headline {n}"),
                subtext: "Because it matters".to_string(),
                call_to_action: "Learn more".to_string(),
                content_type: "Educational".to_string(),
                target_emotion: "Trust".to_string(),
                ..InstagramPost::default()
            });
        }
        strategy
    }

    #[test]
    fn test_one_prompt_per_post_in_order() {
        let agent = PromptAgent::new();
        let records = agent
            .generate_prompts(
                "https://example.com",
                &strategy_with_posts(3),
                &design_with_brand("#1A73E8"),
            )
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.post_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_prompts_embed_real_tokens_not_placeholders() {
        let agent = PromptAgent::new();
        let records = agent
            .generate_prompts(
                "https://example.com",
                &strategy_with_posts(3),
                &design_with_brand("#1A73E8"),
            )
            .unwrap();

        for record in &records {
            assert!(record.image_prompt.contains("#1A73E8"));
            assert!(record.image_prompt.contains("Inter"));
            assert!(record.image_prompt.contains("1080x1080"));
            assert!(!record.image_prompt.contains("#RRGGBB"));
            assert!(!record.image_prompt.contains("FontName"));
        }
        assert!(records[0].image_prompt.contains("Headline 1"));
        assert!(records[0].image_prompt.contains("Learn more"));
    }

    #[test]
    fn test_out_of_order_posts_are_sorted() {
        let mut strategy = strategy_with_posts(3);
        strategy.instagram_posts.reverse();

        let records = PromptAgent::new()
            .generate_prompts(
                "https://example.com",
                &strategy,
                &design_with_brand("#FF5722"),
            )
            .unwrap();
        assert_eq!(
            records.iter().map(|r| r.post_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_visual_spec_is_kept_for_audit() {
        let records = PromptAgent::new()
            .generate_prompts(
                "https://example.com",
                &strategy_with_posts(1),
                &design_with_brand("#1A73E8"),
            )
            .unwrap();
        assert!(records[0].visual_spec.colors.contains(&"#1A73E8".to_string()));
        assert_eq!(records[0].visual_spec.fonts, vec!["Inter"]);
        assert_eq!(records[0].visual_spec.alignment, "center");
    }

    #[test]
    fn test_empty_strategy_is_an_error() {
        let result = PromptAgent::new().generate_prompts(
            "https://example.com",
            &ContentStrategyRecord::default(),
            &DesignTokenRecord::default(),
        );
        assert!(result.is_err());
    }
}
