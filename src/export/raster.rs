//! SVG rasterization with `resvg`, plus PNG/JPEG encoding with `image`.

use std::sync::{Arc, LazyLock};

use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use resvg::tiny_skia;
use tracing::debug;

use super::ExportError;

/// Largest raster edge, in pixels, after supersampling.
pub const MAX_RASTER_DIMENSION: u32 = 8192;

const JPEG_QUALITY: u8 = 90;

/// System fonts, loaded once. Text in exported rasters depends on it.
static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "export: loaded system fonts");
    Arc::new(db)
});

/// An opaque RGBA raster.
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Shrink `requested` so neither edge exceeds [`MAX_RASTER_DIMENSION`].
#[must_use]
pub fn capped_scale(width: f64, height: f64, requested: f64) -> f64 {
    let longest = width.max(height);
    if longest <= 0.0 {
        return requested;
    }
    requested.min(f64::from(MAX_RASTER_DIMENSION) / longest)
}

/// Render `svg` at `scale` over an opaque `background`.
///
/// # Errors
///
/// `SerializationFailure` if the markup does not parse or the target size is
/// empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(svg: &str, scale: f64, background: [u8; 3]) -> Result<Raster, ExportError> {
    let options = resvg::usvg::Options { fontdb: FONTDB.clone(), ..Default::default() };
    let tree = resvg::usvg::Tree::from_str(svg, &options)
        .map_err(|e| ExportError::SerializationFailure(format!("svg parse failed: {e}")))?;

    let size = tree.size();
    let scale = capped_scale(f64::from(size.width()), f64::from(size.height()), scale) as f32;
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ExportError::SerializationFailure(format!("cannot allocate {width}x{height} raster")))?;
    let [r, g, b] = background;
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    debug!(width, height, scale, "export: rasterized");
    Ok(Raster { width, height, rgba: pixmap.take() })
}

/// # Errors
///
/// `SerializationFailure` if the encoder rejects the buffer.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(&raster.rgba, raster.width, raster.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::SerializationFailure(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// Encode rows `[top, top + rows)` of an opaque raster as an RGB JPEG.
///
/// # Errors
///
/// `SerializationFailure` if the encoder rejects the slice.
pub fn encode_jpeg_rows(raster: &Raster, top: u32, rows: u32) -> Result<Vec<u8>, ExportError> {
    let stride = raster.width as usize * 4;
    let start = top as usize * stride;
    let end = start + rows as usize * stride;
    let slice = raster
        .rgba
        .get(start..end)
        .ok_or_else(|| ExportError::SerializationFailure("jpeg slice out of range".into()))?;
    // Background is opaque, so premultiplied RGBA equals straight RGB here.
    let rgb: Vec<u8> = slice.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect();

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .write_image(&rgb, raster.width, rows, image::ExtendedColorType::Rgb8)
        .map_err(|e| ExportError::SerializationFailure(format!("jpeg encode failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "raster_test.rs"]
mod tests;
