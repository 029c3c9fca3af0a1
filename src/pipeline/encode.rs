//! Image encoding: page PNG on disk → size-capped base64 [`ImageData`].
//!
//! Backends accept images as base64 payloads in the JSON request body. PNG
//! is kept end-to-end because it is lossless — text crispness matters far
//! more than file size for a model reading a slide. The only transformation
//! applied is a dimension cap: a high-DPI render of an oversized slide
//! master is scaled down so neither edge exceeds `max_rendered_pixels`,
//! keeping uploads bounded without touching normal-sized pages.

use crate::backend::ImageData;
use crate::error::RenderError;
use crate::pipeline::render::RenderedSlide;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GenericImageView;
use std::io::Cursor;
use tracing::debug;

/// One slide ready for the backend: ordinal + encoded raster.
#[derive(Debug, Clone)]
pub struct SlideImage {
    /// 1-based position within the deck.
    pub ordinal: usize,
    /// Base64 PNG payload.
    pub image: ImageData,
}

/// Load, cap, and base64-encode one rendered page.
pub fn encode_slide(slide: &RenderedSlide, max_pixels: u32) -> Result<SlideImage, RenderError> {
    let img = image::open(&slide.path).map_err(|e| RenderError::UnreadableImage {
        path: slide.path.clone(),
        detail: e.to_string(),
    })?;

    let (w, h) = img.dimensions();
    let img = if w > max_pixels || h > max_pixels {
        debug!(
            "slide {}: capping {}x{} px to fit {} px",
            slide.ordinal, w, h, max_pixels
        );
        img.resize(max_pixels, max_pixels, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| RenderError::UnreadableImage {
            path: slide.path.clone(),
            detail: e.to_string(),
        })?;

    let b64 = STANDARD.encode(&buf);
    debug!("slide {}: encoded → {} bytes base64", slide.ordinal, b64.len());

    Ok(SlideImage {
        ordinal: slide.ordinal,
        image: ImageData::new(b64, "image/png"),
    })
}

/// Encode every rendered page, preserving order.
pub fn encode_slides(
    slides: &[RenderedSlide],
    max_pixels: u32,
) -> Result<Vec<SlideImage>, RenderError> {
    slides
        .iter()
        .map(|slide| encode_slide(slide, max_pixels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_png(dir: &std::path::Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn encode_small_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "slide-1.png", 10, 10);

        let slide = RenderedSlide { ordinal: 1, path };
        let encoded = encode_slide(&slide, 2000).expect("encode should succeed");
        assert_eq!(encoded.ordinal, 1);
        assert_eq!(encoded.image.mime_type, "image/png");
        // Verify it's valid base64 holding a decodable PNG of the same size.
        let bytes = STANDARD.decode(&encoded.image.data).expect("valid base64");
        let back = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!(back.dimensions(), (10, 10));
    }

    #[test]
    fn oversized_image_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "slide-1.png", 64, 32);

        let slide = RenderedSlide { ordinal: 1, path };
        let encoded = encode_slide(&slide, 16).unwrap();
        let bytes = STANDARD.decode(&encoded.image.data).unwrap();
        let back = image::load_from_memory(&bytes).unwrap();
        let (w, h) = back.dimensions();
        assert!(w <= 16 && h <= 16, "got {w}x{h}");
        // Aspect ratio preserved: 2:1 stays 2:1.
        assert_eq!(w, 16);
        assert_eq!(h, 8);
    }

    #[test]
    fn missing_file_is_unreadable_image() {
        let slide = RenderedSlide {
            ordinal: 1,
            path: PathBuf::from("/definitely/not/here.png"),
        };
        let result = encode_slide(&slide, 2000);
        assert!(matches!(result, Err(RenderError::UnreadableImage { .. })));
    }

    #[test]
    fn encode_slides_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let slides: Vec<RenderedSlide> = (1..=3)
            .map(|i| RenderedSlide {
                ordinal: i,
                path: write_png(dir.path(), &format!("slide-{i}.png"), 4, 4),
            })
            .collect();

        let encoded = encode_slides(&slides, 2000).unwrap();
        assert_eq!(
            encoded.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
