//! Phase 5: brand image rendering.
//!
//! Two interchangeable strategies: delegate to the AI image-generation
//! capability, or composite the extracted brand tokens locally. Either way
//! the batch continues past individual failures and emits one manifest
//! entry per prompt, in input order.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};

use crate::agents::{sanitize_domain, today};
use crate::error::{Error, Result};
use crate::external::ArtifactStore;
use crate::providers::AiProvider;
use crate::types::design::hex_to_rgb;
use crate::types::{
    DesignTokenRecord, ImageEntry, ImageManifestRecord, ImageStatus, PromptRecord,
};

const CANVAS_SIZE: u32 = 1080;
/// Minimum 0-255 luma difference between text and background before the
/// text color is forced to pure black or white.
const CONTRAST_THRESHOLD: f64 = 80.0;

#[async_trait]
pub trait ImageRenderer: Send + Sync {
    /// (provider, model) recorded in the manifest, when known.
    fn backend(&self) -> (Option<String>, Option<String>) {
        (None, None)
    }

    async fn render(&self, prompt: &PromptRecord, design: &DesignTokenRecord) -> Result<Vec<u8>>;
}

/// Delegates each prompt to the AI image-generation capability.
pub struct AiImageRenderer {
    provider: Arc<dyn AiProvider>,
}

impl AiImageRenderer {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ImageRenderer for AiImageRenderer {
    fn backend(&self) -> (Option<String>, Option<String>) {
        (
            Some(self.provider.name().to_string()),
            Some(self.provider.model().to_string()),
        )
    }

    async fn render(&self, prompt: &PromptRecord, _design: &DesignTokenRecord) -> Result<Vec<u8>> {
        self.provider.generate_image(&prompt.image_prompt).await
    }
}

/// Composites brand colors and post copy onto a fixed-size canvas without
/// any upstream call. Used when image generation is unavailable or a
/// deterministic output is wanted.
pub struct LocalImageRenderer;

#[async_trait]
impl ImageRenderer for LocalImageRenderer {
    async fn render(&self, prompt: &PromptRecord, design: &DesignTokenRecord) -> Result<Vec<u8>> {
        compose_canvas(prompt, design)
    }
}

pub struct ImageAgent {
    renderer: Arc<dyn ImageRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl ImageAgent {
    pub fn new(renderer: Arc<dyn ImageRenderer>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self { renderer, artifacts }
    }

    pub async fn render_images(
        &self,
        url: &str,
        prompts: &[PromptRecord],
        design: &DesignTokenRecord,
    ) -> Result<ImageManifestRecord> {
        if prompts.is_empty() {
            return Err(Error::InvalidInput("no prompts to render".to_string()));
        }

        let domain = sanitize_domain(url);
        let (provider, model) = self.renderer.backend();

        let mut manifest = ImageManifestRecord {
            domain: domain.clone(),
            url: url.to_string(),
            timestamp: today(),
            total_images: prompts.len(),
            ai_provider: provider,
            ai_model: model,
            images: Vec::with_capacity(prompts.len()),
        };

        for prompt in prompts {
            log::info!(
                "rendering image {}/{} for {domain}",
                prompt.post_number,
                prompts.len()
            );
            manifest.images.push(self.render_one(&domain, prompt, design).await);
        }

        let metadata_path = format!("images/{domain}/{domain}-metadata.json");
        if let Err(err) = self
            .artifacts
            .save_json(&serde_json::to_value(&manifest)?, &metadata_path)
        {
            log::warn!("could not save image manifest: {err}");
        }

        log::info!(
            "rendered {}/{} images for {domain}",
            manifest.successes(),
            manifest.total_images
        );
        Ok(manifest)
    }

    async fn render_one(
        &self,
        domain: &str,
        prompt: &PromptRecord,
        design: &DesignTokenRecord,
    ) -> ImageEntry {
        let bytes = match self.renderer.render(prompt, design).await {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("image {} failed: {err}", prompt.post_number);
                return failed_entry(prompt.post_number, err.to_string());
            }
        };

        let filename = format!("{domain}-post-{}.png", prompt.post_number);
        let logical_path = format!("images/{domain}/{filename}");
        match self.artifacts.save_bytes(&bytes, &logical_path) {
            Ok(path) => ImageEntry {
                post_number: prompt.post_number,
                status: ImageStatus::Success,
                filename: Some(filename),
                filepath: Some(path.display().to_string()),
                file_size: Some(bytes.len() as u64),
                error: None,
            },
            Err(err) => {
                log::error!("could not persist image {}: {err}", prompt.post_number);
                failed_entry(prompt.post_number, err.to_string())
            }
        }
    }
}

fn failed_entry(post_number: u32, error: String) -> ImageEntry {
    ImageEntry {
        post_number,
        status: ImageStatus::Failed,
        filename: None,
        filepath: None,
        file_size: None,
        error: Some(error),
    }
}

fn compose_canvas(prompt: &PromptRecord, design: &DesignTokenRecord) -> Result<Vec<u8>> {
    let kit = &design.color_kit;
    let background = hex_to_rgb(&kit.background.hex).unwrap_or((255, 255, 255));
    let brand = hex_to_rgb(&kit.brand_primary.hex).unwrap_or((0, 122, 255));
    let text = hex_to_rgb(&kit.text_primary.hex).unwrap_or((29, 29, 31));

    let mut canvas = RgbImage::from_pixel(
        CANVAS_SIZE,
        CANVAS_SIZE,
        Rgb([background.0, background.1, background.2]),
    );

    fill_rect(&mut canvas, 0, 0, CANVAS_SIZE, 24, brand);
    fill_rect(&mut canvas, 0, CANVAS_SIZE - 24, CANVAS_SIZE, 24, brand);

    let headline_color = contrast_corrected(text, background);
    draw_text_centered(&mut canvas, &prompt.headline, 430, 10, headline_color);

    if !prompt.target_emotion.trim().is_empty() {
        draw_text_centered(
            &mut canvas,
            &prompt.target_emotion,
            560,
            5,
            contrast_corrected(text, background),
        );
    }

    // CTA band in the brand color with its own contrast pass
    fill_rect(&mut canvas, 240, 720, CANVAS_SIZE - 480, 110, brand);
    let cta_color = contrast_corrected(text, brand);
    let cta_text = if prompt.concept.trim().is_empty() {
        &prompt.headline
    } else {
        &prompt.concept
    };
    draw_text_centered(&mut canvas, cta_text, 756, 6, cta_color);

    let mut out = Vec::new();
    DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

fn luma(rgb: (u8, u8, u8)) -> f64 {
    0.2126 * rgb.0 as f64 + 0.7152 * rgb.1 as f64 + 0.0722 * rgb.2 as f64
}

/// Keep the extracted text color when it reads against the surface;
/// otherwise force pure black or white, whichever contrasts more.
fn contrast_corrected(text: (u8, u8, u8), surface: (u8, u8, u8)) -> (u8, u8, u8) {
    if (luma(text) - luma(surface)).abs() >= CONTRAST_THRESHOLD {
        return text;
    }
    if luma(surface) > 127.5 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: (u8, u8, u8)) {
    let pixel = Rgb([color.0, color.1, color.2]);
    for py in y..(y + height).min(canvas.height()) {
        for px in x..(x + width).min(canvas.width()) {
            canvas.put_pixel(px, py, pixel);
        }
    }
}

fn draw_text_centered(canvas: &mut RgbImage, text: &str, y: u32, scale: u32, color: (u8, u8, u8)) {
    let max_chars = (canvas.width() / (6 * scale)).saturating_sub(2) as usize;
    let shown: String = text.chars().take(max_chars).collect();
    let width = shown.chars().count() as u32 * 6 * scale;
    let x = canvas.width().saturating_sub(width) / 2;
    draw_text(canvas, &shown, x, y, scale, color);
}

fn draw_text(
    canvas: &mut RgbImage,
    text: &str,
    x: u32,
    y: u32,
    scale: u32,
    color: (u8, u8, u8),
) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch.to_ascii_uppercase()) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..5u32 {
                    if bits & (0x10 >> col) != 0 {
                        fill_rect(
                            canvas,
                            cursor_x + col * scale,
                            y + row as u32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
        cursor_x += 6 * scale;
    }
}

/// 5x7 block glyphs, one bit per pixel, MSB on the left.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '&' => [0x08, 0x14, 0x14, 0x08, 0x15, 0x12, 0x0D],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::external::FsArtifactStore;
    use crate::types::ColorSwatch;

    struct FlakyRenderer;

    #[async_trait]
    impl ImageRenderer for FlakyRenderer {
        async fn render(
            &self,
            prompt: &PromptRecord,
            _design: &DesignTokenRecord,
        ) -> Result<Vec<u8>> {
            if prompt.post_number == 2 {
                Err(Error::InvalidInput("scripted failure".to_string()))
            } else {
                Ok(vec![0u8; 8])
            }
        }
    }

    fn prompts(count: u32) -> Vec<PromptRecord> {
        (1..=count)
            .map(|n| PromptRecord {
                post_number: n,
                headline: format!("Post {n}"),
                image_prompt: format!("prompt {n}"),
                ..PromptRecord::default()
            })
            .collect()
    }

    #[test]
    fn test_contrast_correction() {
        // light gray on white: unreadable, forced to black
        assert_eq!(
            contrast_corrected((200, 200, 200), (255, 255, 255)),
            (0, 0, 0)
        );
        // dark on dark navy: forced to white
        assert_eq!(contrast_corrected((20, 20, 40), (10, 10, 60)), (255, 255, 255));
        // good contrast passes through
        assert_eq!(
            contrast_corrected((17, 17, 17), (255, 255, 255)),
            (17, 17, 17)
        );
    }

    #[test]
    fn test_glyphs_cover_alphanumerics() {
        for ch in ('A'..='Z').chain('0'..='9') {
            assert!(glyph(ch).is_some(), "missing glyph for {ch}");
        }
        assert!(glyph(' ').is_some());
        assert!(glyph('~').is_none());
    }

    #[tokio::test]
    async fn test_local_render_produces_canvas_png() {
        let mut design = DesignTokenRecord::neutral_defaults("https://example.com");
        design.color_kit.background = ColorSwatch::new("#102030", "page");

        let bytes = LocalImageRenderer
            .render(&prompts(1)[0], &design)
            .await
            .unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.width(), CANVAS_SIZE);
        assert_eq!(decoded.height(), CANVAS_SIZE);
        // background fill shows through away from bands and text
        assert_eq!(decoded.get_pixel(540, 300), &Rgb([0x10, 0x20, 0x30]));
    }

    #[tokio::test]
    async fn test_batch_continues_on_individual_failure() {
        let dir = tempfile::tempdir().unwrap();
        let agent = ImageAgent::new(
            Arc::new(FlakyRenderer),
            Arc::new(FsArtifactStore::new(dir.path())),
        );

        let manifest = agent
            .render_images(
                "https://example.com",
                &prompts(3),
                &DesignTokenRecord::default(),
            )
            .await
            .unwrap();

        assert_eq!(manifest.total_images, 3);
        assert_eq!(
            manifest.images.iter().map(|e| e.post_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(manifest.images[0].status, ImageStatus::Success);
        assert_eq!(manifest.images[1].status, ImageStatus::Failed);
        assert!(manifest.images[1].error.is_some());
        assert_eq!(manifest.images[2].status, ImageStatus::Success);
        assert_eq!(manifest.successes(), 2);

        // metadata manifest is persisted alongside the images
        assert!(dir
            .path()
            .join("images/example-com/example-com-metadata.json")
            .exists());
        assert!(dir
            .path()
            .join("images/example-com/example-com-post-1.png")
            .exists());
    }
}
