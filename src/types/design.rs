use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visual design tokens extracted from a website screenshot and markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignTokenRecord {
    #[serde(default)]
    pub style_snapshot: Value,
    #[serde(default)]
    pub color_kit: ColorKit,
    #[serde(default)]
    pub typography_kit: TypographyKit,
    #[serde(default)]
    pub composition: Composition,
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
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorSwatch {
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub where_seen: String,
}

impl ColorSwatch {
    pub fn new(hex: impl Into<String>, where_seen: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            where_seen: where_seen.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorKit {
    #[serde(default)]
    pub background: ColorSwatch,
    #[serde(default)]
    pub brand_primary: ColorSwatch,
    #[serde(default)]
    pub text_primary: ColorSwatch,
    #[serde(default)]
    pub text_secondary: ColorSwatch,
    #[serde(default)]
    pub accent_colors: Vec<ColorSwatch>,
    #[serde(default)]
    pub additional_colors: Vec<ColorSwatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontFamily {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypographyKit {
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub likely_families: Vec<FontFamily>,
    #[serde(default)]
    pub weights_used: Map<String, Value>,
    #[serde(default)]
    pub sizes_observed: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub alignment: String,
    #[serde(default)]
    pub shape_cues: Vec<String>,
    #[serde(default)]
    pub spacing_patterns: String,
}

impl DesignTokenRecord {
    /// Neutral tokens used when neither the screenshot nor the markup
    /// yields anything usable.
    pub fn neutral_defaults(url: &str) -> Self {
        Self {
            color_kit: ColorKit {
                background: ColorSwatch::new("#FFFFFF", "assumed main background"),
                brand_primary: ColorSwatch::new("#007AFF", "estimated brand color"),
                text_primary: ColorSwatch::new("#1D1D1F", "standard dark text"),
                text_secondary: ColorSwatch::new("#86868B", "standard gray text"),
                accent_colors: Vec::new(),
                additional_colors: Vec::new(),
            },
            typography_kit: TypographyKit {
                classification: "sans-serif".to_string(),
                likely_families: vec![FontFamily {
                    name: "System Font".to_string(),
                    confidence: 0.5,
                }],
                ..TypographyKit::default()
            },
            composition: Composition {
                alignment: "left".to_string(),
                ..Composition::default()
            },
            url: url.to_string(),
            analysis_method: "fallback_defaults".to_string(),
            ..Self::default()
        }
    }

    /// Every hex the kit carries, brand primary first, deduplicated.
    pub fn palette(&self) -> Vec<String> {
        let kit = &self.color_kit;
        let mut palette = Vec::new();
        for swatch in [
            &kit.brand_primary,
            &kit.background,
            &kit.text_primary,
            &kit.text_secondary,
        ]
        .into_iter()
        .chain(kit.accent_colors.iter())
        .chain(kit.additional_colors.iter())
        {
            if is_hex_color(&swatch.hex) && !palette.contains(&swatch.hex) {
                palette.push(swatch.hex.clone());
            }
        }
        palette
    }

    pub fn font_names(&self) -> Vec<String> {
        self.typography_kit
            .likely_families
            .iter()
            .filter(|f| !f.name.trim().is_empty())
            .map(|f| f.name.clone())
            .collect()
    }
}

/// `#RRGGBB` → (r, g, b).
pub fn hex_to_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let normalized = normalize_hex(value)?;
    let digits = &normalized[1..];
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Relative luminance in [0, 1] (WCAG weights).
pub fn luminance(value: &str) -> Option<f64> {
    let (r, g, b) = hex_to_rgb(value)?;
    let channel = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Some(0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b))
}

/// `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Coerce `fff` / `#ABC` / `#a1b2c3` style values into `#A1B2C3` form.
pub fn normalize_hex(value: &str) -> Option<String> {
    let digits = value.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", expanded.to_uppercase()))
}
