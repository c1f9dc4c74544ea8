//! Phase 2: screenshot capture and design-token extraction.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use regex::Regex;

use crate::agents::today;
use crate::error::Result;
use crate::external::screenshot::ViewportSpec;
use crate::external::{HtmlFetcher, InstructionStore, ScreenshotClient};
use crate::providers::AiProvider;
use crate::resilience::{recover_json, Recovered};
use crate::types::design::{is_hex_color, luminance, normalize_hex};
use crate::types::{ColorSwatch, DesignTokenRecord, FontFamily};

/// Vision API limits: longest side and upload size the screenshot must fit.
const MAX_DIMENSION: u32 = 7500;
const MAX_UPLOAD_BYTES: usize = 15_000_000;
const JPEG_QUALITY: u8 = 85;

const ANALYZER_TEMPLATE: &str = "screenshot_analyzer";

const DEFAULT_VISION_INSTRUCTIONS: &str = r##"You are a professional brand designer analyzing a website screenshot.

Return ONLY a JSON object, no explanations, no markdown fences. Extract the ACTUAL
hex colors you see, never placeholders. Follow this schema exactly:

{
  "style_snapshot": {"vibe_keywords": ["w1", "w2", "w3"], "art_direction": "one sentence"},
  "color_kit": {
    "background": {"hex": "#RRGGBB", "where_seen": "main background"},
    "brand_primary": {"hex": "#RRGGBB", "where_seen": "logo/primary buttons"},
    "text_primary": {"hex": "#RRGGBB", "where_seen": "main headings"},
    "text_secondary": {"hex": "#RRGGBB", "where_seen": "body text"},
    "accent_colors": [{"hex": "#RRGGBB", "where_seen": "element"}],
    "additional_colors": [{"hex": "#RRGGBB", "where_seen": "element"}]
  },
  "typography_kit": {
    "classification": "serif/sans-serif/monospace",
    "likely_families": [{"name": "FontName", "confidence": 0.8}],
    "weights_used": {"h1": 700, "body": 400},
    "sizes_observed": {"h1": "32px", "body": "16px"}
  },
  "composition": {"alignment": "left/center/right", "shape_cues": [], "spacing_patterns": ""}
}"##;

/// Colors and fonts lifted straight from the page markup, used to seed and
/// cross-check the vision output.
#[derive(Debug, Default)]
pub struct MarkupTokens {
    /// (hex, weight) sorted descending by weight.
    pub colors: Vec<(String, f64)>,
    pub fonts: Vec<String>,
}

pub struct DesignAgent {
    provider: Arc<dyn AiProvider>,
    screenshot: Arc<dyn ScreenshotClient>,
    fetcher: Arc<dyn HtmlFetcher>,
    instructions: Arc<dyn InstructionStore>,
}

impl DesignAgent {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        screenshot: Arc<dyn ScreenshotClient>,
        fetcher: Arc<dyn HtmlFetcher>,
        instructions: Arc<dyn InstructionStore>,
    ) -> Self {
        Self {
            provider,
            screenshot,
            fetcher,
            instructions,
        }
    }

    pub async fn analyze(&self, url: &str) -> Result<DesignTokenRecord> {
        let markup = match self.fetcher.fetch(url).await {
            Ok(html) => scan_markup_tokens(&html),
            Err(err) => {
                log::warn!("markup fetch failed for {url}: {err}");
                MarkupTokens::default()
            }
        };

        let mut record = match self.vision_analysis(url).await {
            Ok(record) => record,
            Err(err) => {
                log::warn!("vision analysis failed for {url}: {err}; using defaults");
                DesignTokenRecord::neutral_defaults(url)
            }
        };

        enrich_with_markup(&mut record, &markup);
        record.url = url.to_string();
        record.timestamp = today();
        record.ai_provider = Some(self.provider.name().to_string());
        record.ai_model = Some(self.provider.model().to_string());
        Ok(record)
    }

    async fn vision_analysis(&self, url: &str) -> Result<DesignTokenRecord> {
        let raw = self
            .screenshot
            .capture(url, &ViewportSpec::default())
            .await?;
        let (bytes, media_type) = prepare_vision_image(raw)?;

        let instructions = match self.instructions.load(ANALYZER_TEMPLATE)? {
            Some(template) => format!("{template}\n\nAnalyze this website screenshot for {url}."),
            None => format!("{DEFAULT_VISION_INSTRUCTIONS}\n\nAnalyze this website screenshot for {url}."),
        };

        let response = self
            .provider
            .analyze_image(&bytes, media_type, &instructions)
            .await?;

        match recover_json(&response) {
            Recovered::Parsed(value) => {
                let mut record: DesignTokenRecord = serde_json::from_value(value)?;
                record.analysis_method = "ai_vision_analysis".to_string();
                Ok(record)
            }
            Recovered::Fallback { raw_text } => {
                log::warn!("vision output for {url} was not structured JSON");
                let mut record = DesignTokenRecord::neutral_defaults(url);
                record.analysis_method = "ai_text_analysis".to_string();
                record
                    .extra
                    .insert("raw_analysis".to_string(), raw_text.into());
                Ok(record)
            }
        }
    }
}

/// Resize/re-encode a screenshot that exceeds the vision API limits.
/// Small images pass through untouched as PNG.
pub fn prepare_vision_image(bytes: Vec<u8>) -> Result<(Vec<u8>, &'static str)> {
    let decoded = image::load_from_memory(&bytes)?;
    let (width, height) = (decoded.width(), decoded.height());
    let longest = width.max(height);

    if longest <= MAX_DIMENSION && bytes.len() <= MAX_UPLOAD_BYTES {
        return Ok((bytes, "image/png"));
    }

    log::info!(
        "compressing screenshot: {width}x{height}, {} bytes",
        bytes.len()
    );

    let resized = if longest > MAX_DIMENSION {
        let scale = MAX_DIMENSION as f64 / longest as f64;
        let new_width = (width as f64 * scale) as u32;
        let new_height = (height as f64 * scale) as u32;
        decoded.resize(new_width.max(1), new_height.max(1), FilterType::Lanczos3)
    } else {
        decoded
    };

    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;

    Ok((out, "image/jpeg"))
}

/// Frequency-weighted scan of hex colors and font families in the markup.
/// Custom properties and brand-relevant selectors outweigh generic
/// declarations; near-white/near-black are excluded from brand candidacy.
pub fn scan_markup_tokens(html: &str) -> MarkupTokens {
    let mut weighted: Vec<(String, f64)> = Vec::new();

    let color_pattern = Regex::new(r"#[0-9a-fA-F]{6}\b|#[0-9a-fA-F]{3}\b").unwrap();
    let brand_context = Regex::new(r"(?i)button|\.btn|nav|brand|primary|logo|cta").unwrap();
    let custom_property = Regex::new(r"--[\w-]+\s*:\s*$").unwrap();

    for found in color_pattern.find_iter(html) {
        let Some(hex) = normalize_hex(found.as_str()) else {
            continue;
        };

        let start = found.start();
        let context = &html[start.saturating_sub(80)..start];
        let mut weight = 1.0;
        if custom_property.is_match(context) {
            weight += 3.0;
        }
        if brand_context.is_match(context) {
            weight += 2.0;
        }

        match weighted.iter_mut().find(|(h, _)| *h == hex) {
            Some((_, total)) => *total += weight,
            None => weighted.push((hex, weight)),
        }
    }

    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let font_pattern = Regex::new(r"(?i)font-family\s*:\s*([^;}<]+)").unwrap();
    let mut fonts: Vec<String> = Vec::new();
    for captures in font_pattern.captures_iter(html) {
        for family in captures[1].split(',') {
            let name = family
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .trim()
                .to_string();
            if name.is_empty() || is_generic_family(&name) {
                continue;
            }
            if !fonts.iter().any(|f| f.eq_ignore_ascii_case(&name)) {
                fonts.push(name);
            }
            break; // only the leading concrete family per declaration
        }
    }

    MarkupTokens {
        colors: weighted,
        fonts,
    }
}

fn is_generic_family(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui" | "inherit"
    )
}

fn is_near_neutral(hex: &str) -> bool {
    luminance(hex).map(|l| l > 0.85 || l < 0.05).unwrap_or(true)
}

/// Fill holes in the vision output from the markup scan, and normalize
/// every color to `#RRGGBB`.
pub fn enrich_with_markup(record: &mut DesignTokenRecord, markup: &MarkupTokens) {
    let kit = &mut record.color_kit;
    for swatch in [
        &mut kit.background,
        &mut kit.brand_primary,
        &mut kit.text_primary,
        &mut kit.text_secondary,
    ] {
        if let Some(normalized) = normalize_hex(&swatch.hex) {
            swatch.hex = normalized;
        }
    }
    kit.accent_colors.retain_mut(|swatch| {
        match normalize_hex(&swatch.hex) {
            Some(normalized) => {
                swatch.hex = normalized;
                true
            }
            None => false,
        }
    });
    kit.additional_colors.retain_mut(|swatch| {
        match normalize_hex(&swatch.hex) {
            Some(normalized) => {
                swatch.hex = normalized;
                true
            }
            None => false,
        }
    });

    if !is_hex_color(&kit.brand_primary.hex) {
        let brand = markup
            .colors
            .iter()
            .find(|(hex, _)| !is_near_neutral(hex))
            .or_else(|| markup.colors.first());
        if let Some((hex, _)) = brand {
            kit.brand_primary = ColorSwatch::new(hex.clone(), "markup scan");
        }
    }
    if !is_hex_color(&kit.background.hex) {
        let background = markup
            .colors
            .iter()
            .find(|(hex, _)| luminance(hex).map(|l| l > 0.85).unwrap_or(false));
        kit.background = match background {
            Some((hex, _)) => ColorSwatch::new(hex.clone(), "markup scan"),
            None => ColorSwatch::new("#FFFFFF", "assumed main background"),
        };
    }
    if !is_hex_color(&kit.text_primary.hex) {
        let text = markup
            .colors
            .iter()
            .find(|(hex, _)| luminance(hex).map(|l| l < 0.05).unwrap_or(false));
        kit.text_primary = match text {
            Some((hex, _)) => ColorSwatch::new(hex.clone(), "markup scan"),
            None => ColorSwatch::new("#1D1D1F", "standard dark text"),
        };
    }

    record.typography_kit.likely_families.retain(|family| {
        !family.name.trim().is_empty() && (0.0..=1.0).contains(&family.confidence)
    });
    if record.typography_kit.likely_families.is_empty() {
        record.typography_kit.likely_families = markup
            .fonts
            .iter()
            .map(|name| FontFamily {
                name: name.clone(),
                confidence: 0.6,
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::MockProvider;
    use async_trait::async_trait;
    use image::RgbaImage;
    use std::io::Cursor;

    struct FixedScreenshot(Vec<u8>);

    #[async_trait]
    impl ScreenshotClient for FixedScreenshot {
        async fn capture(&self, _url: &str, _viewport: &ViewportSpec) -> Result<Vec<u8>> {
            if self.0.is_empty() {
                return Err(Error::InvalidInput("no screenshot".to_string()));
            }
            Ok(self.0.clone())
        }
    }

    struct FixedFetcher(String);

    #[async_trait]
    impl HtmlFetcher for FixedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct NoTemplates;

    impl InstructionStore for NoTemplates {
        fn load(&self, _agent_name: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    const STYLED_PAGE: &str = r#"<html><head><style>
        :root { --brand-color: #1A73E8; }
        body { background: #ffffff; color: #111111; font-family: "Inter", sans-serif; }
        .btn { background: #1a73e8; }
        .muted { color: #888888; }
    </style></head><body><p style="color:#FF5722">hi</p></body></html>"#;

    #[test]
    fn test_scan_markup_weights_brand_colors() {
        let tokens = scan_markup_tokens(STYLED_PAGE);
        // the custom property + button usage outweighs everything else
        assert_eq!(tokens.colors[0].0, "#1A73E8");
        assert!(tokens.fonts.contains(&"Inter".to_string()));
        // generic family is not a font candidate
        assert!(!tokens.fonts.iter().any(|f| f == "sans-serif"));
    }

    #[test]
    fn test_prepare_vision_image_passthrough() {
        let png = tiny_png();
        let (bytes, media_type) = prepare_vision_image(png.clone()).unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(bytes, png);
    }

    #[test]
    fn test_enrich_fills_missing_brand_from_markup() {
        let markup = scan_markup_tokens(STYLED_PAGE);
        let mut record = DesignTokenRecord::default();
        record.color_kit.brand_primary.hex = "#ACTUAL_HEX".to_string(); // model placeholder
        enrich_with_markup(&mut record, &markup);
        assert_eq!(record.color_kit.brand_primary.hex, "#1A73E8");
        assert!(is_hex_color(&record.color_kit.background.hex));
        assert!(is_hex_color(&record.color_kit.text_primary.hex));
        assert_eq!(record.typography_kit.likely_families[0].name, "Inter");
    }

    #[test]
    fn test_enrich_normalizes_short_hex() {
        let mut record = DesignTokenRecord::default();
        record.color_kit.brand_primary.hex = "#abc".to_string();
        record.color_kit.accent_colors = vec![
            ColorSwatch::new("not-a-color", "junk"),
            ColorSwatch::new("1a73e8", "button"),
        ];
        enrich_with_markup(&mut record, &MarkupTokens::default());
        assert_eq!(record.color_kit.brand_primary.hex, "#AABBCC");
        assert_eq!(record.color_kit.accent_colors.len(), 1);
        assert_eq!(record.color_kit.accent_colors[0].hex, "#1A73E8");
    }

    #[tokio::test]
    async fn test_analyze_happy_path() {
        let vision_json = r##"{
            "color_kit": {
                "background": {"hex": "#FFFFFF", "where_seen": "page"},
                "brand_primary": {"hex": "#1A73E8", "where_seen": "buttons"},
                "text_primary": {"hex": "#111111", "where_seen": "headings"},
                "text_secondary": {"hex": "#666666", "where_seen": "body"}
            },
            "typography_kit": {
                "classification": "sans-serif",
                "likely_families": [{"name": "Inter", "confidence": 0.9}]
            },
            "composition": {"alignment": "left"}
        }"##;

        let agent = DesignAgent::new(
            Arc::new(MockProvider::with_response(vision_json)),
            Arc::new(FixedScreenshot(tiny_png())),
            Arc::new(FixedFetcher(STYLED_PAGE.to_string())),
            Arc::new(NoTemplates),
        );

        let record = agent.analyze("https://example.com").await.unwrap();
        assert_eq!(record.analysis_method, "ai_vision_analysis");
        assert_eq!(record.color_kit.brand_primary.hex, "#1A73E8");
        assert_eq!(record.url, "https://example.com");
    }

    #[tokio::test]
    async fn test_analyze_degrades_to_defaults() {
        // screenshot capture fails and the page has no styling to mine
        let agent = DesignAgent::new(
            Arc::new(MockProvider::new()),
            Arc::new(FixedScreenshot(Vec::new())),
            Arc::new(FixedFetcher("<html><body>plain</body></html>".to_string())),
            Arc::new(NoTemplates),
        );

        let record = agent.analyze("https://example.com").await.unwrap();
        assert_eq!(record.analysis_method, "fallback_defaults");
        assert!(is_hex_color(&record.color_kit.brand_primary.hex));
    }
}
