//! Watermark text rendering
//!
//! Loads the label font once per run and burns `"<timestamp> (<offset>)"`
//! into a canvas. The text starts `offset_x` pixels from the left edge and
//! sits on a baseline `offset_y` pixels above the bottom edge. Nothing is
//! wrapped or clamped: text running past the canvas is clipped.

use crate::config::RunConfig;
use crate::error::{Error, Result};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::path::Path;
use tracing::debug;

/// DejaVu Sans, shipped with the binary (license in `assets/fonts`)
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Rendering resolution used to turn points into pixels
pub const RENDER_DPI: f32 = 72.0;

/// A parsed font face sized for drawing
pub struct RasterFont {
    font: FontVec,
    scale: PxScale,
    origin: String,
}

impl RasterFont {
    /// Load the configured font, or the bundled one when no path is given
    pub fn load(font_path: Option<&Path>, size_pt: f32) -> Result<Self> {
        match font_path {
            Some(path) => Self::from_file(path, size_pt),
            None => Self::bundled(size_pt),
        }
    }

    /// The font compiled into the binary
    pub fn bundled(size_pt: f32) -> Result<Self> {
        Self::from_bytes(BUNDLED_FONT.to_vec(), size_pt, "bundled DejaVu Sans".into())
    }

    /// A TrueType/OpenType file on disk
    pub fn from_file(path: &Path, size_pt: f32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::FontRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(data, size_pt, path.display().to_string())
    }

    fn from_bytes(data: Vec<u8>, size_pt: f32, origin: String) -> Result<Self> {
        if !size_pt.is_finite() || size_pt <= 0.0 {
            return Err(Error::InvalidFontSize { size: size_pt });
        }

        let font = FontVec::try_from_vec(data).map_err(|e| Error::FontParse {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        let scale = point_size_to_scale(&font, size_pt);
        debug!(font = %origin, size_pt, scale = scale.y, "Loaded font");

        Ok(Self {
            font,
            scale,
            origin,
        })
    }

    /// Pixel scale passed to the rasterizer
    pub fn scale(&self) -> PxScale {
        self.scale
    }

    /// Where the font data came from, for logging
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Distance from the baseline to the top of the line, in pixels
    pub fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    /// Pixel box covered by the glyph outlines of `text`
    ///
    /// Relative to the rasterizer's top-left origin, as `(min_x, min_y,
    /// max_x, max_y)` with exclusive maxima. Glyphs are placed the way
    /// `draw_text_mut` places them: pen advancing from the left, baseline
    /// one ascent below the origin. `None` when nothing has an outline.
    pub fn ink_extent(&self, text: &str) -> Option<(i64, i64, i64, i64)> {
        let scaled = self.font.as_scaled(self.scale);
        let mut pen = 0.0f32;
        let mut last = None;
        let mut extent: Option<(i64, i64, i64, i64)> = None;

        for c in text.chars() {
            let glyph_id = scaled.glyph_id(c);
            let glyph = glyph_id.with_scale_and_position(self.scale, point(pen, scaled.ascent()));
            pen += scaled.h_advance(glyph_id);

            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            if let Some(last) = last {
                pen += scaled.kern(glyph_id, last);
            }
            last = Some(glyph_id);

            let bb = outlined.px_bounds();
            let min_x = bb.min.x.round() as i64;
            let min_y = bb.min.y.round() as i64;
            let max_x = min_x + bb.width().ceil() as i64;
            let max_y = min_y + bb.height().ceil() as i64;

            extent = Some(match extent {
                None => (min_x, min_y, max_x, max_y),
                Some((x0, y0, x1, y1)) => (x0.min(min_x), y0.min(min_y), x1.max(max_x), y1.max(max_y)),
            });
        }

        extent
    }
}

/// Convert a point size to the rasterizer's pixel scale at [`RENDER_DPI`]
///
/// `PxScale` is the full line height (ascent minus descent), not the em size,
/// so the em is stretched by the font's own height-to-em ratio.
fn point_size_to_scale(font: &impl Font, size_pt: f32) -> PxScale {
    let px_per_em = size_pt * RENDER_DPI / 72.0;
    match font.units_per_em() {
        Some(units_per_em) => PxScale::from(px_per_em * font.height_unscaled() / units_per_em),
        None => PxScale::from(px_per_em),
    }
}

/// Fixed placement and color of the watermark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkStyle {
    pub color: Rgba<u8>,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl From<&RunConfig> for WatermarkStyle {
    fn from(config: &RunConfig) -> Self {
        Self {
            color: config.color,
            offset_x: config.offset_x,
            offset_y: config.offset_y,
        }
    }
}

/// Pixel rectangle the watermark may touch, possibly partly off-canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl TextBounds {
    pub fn contains(&self, px: u32, py: u32) -> bool {
        let (px, py) = (px as i64, py as i64);
        px >= self.x
            && px < self.x + self.width as i64
            && py >= self.y
            && py < self.y + self.height as i64
    }
}

/// Build the label text: `"YYYY-MM-DD HH:MM:SS (<offset>)"`
pub fn watermark_text(timestamp: &str, day_offset: i64) -> String {
    format!("{} ({})", timestamp, day_offset)
}

/// Top-left corner handed to the rasterizer
///
/// The rasterizer places the baseline `ascent` pixels below `y`, so the top
/// is lifted by the ascent to land the baseline at `height - offset_y`.
fn text_origin(canvas_height: u32, font: &RasterFont, style: &WatermarkStyle) -> (i32, i32) {
    let baseline = canvas_height as i64 - style.offset_y as i64;
    let top = baseline - font.ascent().round() as i64;
    (clamp_origin(style.offset_x as i64), clamp_origin(top))
}

/// Largest origin coordinate handed to the rasterizer
///
/// The rasterizer adds glyph offsets to the origin in `i32`, so the origin
/// keeps headroom. Anything this far out is off-canvas either way.
const MAX_ORIGIN: i64 = (i32::MAX / 2) as i64;

fn clamp_origin(v: i64) -> i32 {
    v.clamp(-MAX_ORIGIN, MAX_ORIGIN) as i32
}

/// Region that drawing `text` onto a canvas of `canvas_height` can modify
///
/// Covers every glyph outline, descenders included, padded by one pixel on
/// each side for anti-aliasing spill.
pub fn watermark_bounds(
    canvas_height: u32,
    font: &RasterFont,
    style: &WatermarkStyle,
    text: &str,
) -> TextBounds {
    let (x, y) = text_origin(canvas_height, font, style);
    let (x, y) = (x as i64, y as i64);

    match font.ink_extent(text) {
        Some((min_x, min_y, max_x, max_y)) => TextBounds {
            x: x + min_x - 1,
            y: y + min_y - 1,
            width: (max_x - min_x + 2) as u32,
            height: (max_y - min_y + 2) as u32,
        },
        None => TextBounds {
            x,
            y,
            width: 0,
            height: 0,
        },
    }
}

/// Draw `text` onto `canvas`, blending glyph coverage over existing pixels
pub fn draw_watermark(canvas: &mut RgbaImage, font: &RasterFont, style: &WatermarkStyle, text: &str) {
    let (x, y) = text_origin(canvas.height(), font, style);
    draw_text_mut(canvas, style.color, x, y, font.scale, &font.font, text);
}
