// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas renderer — composite a base page raster with an ordered annotation
// list using `imageproc` drawing primitives and `ab_glyph` text.
//
// Every call starts from a full copy of the base raster and redraws all
// annotations in list order, then the in-progress gesture on top. Nothing is
// cached between calls.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use blattwerk_core::Color;
use blattwerk_core::error::{BlattwerkError, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut};
use tracing::{debug, instrument};

use crate::annotation::{Annotation, AnnotationKind, Point, circle_geometry};

/// Stroke width used when none is configured.
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Estimated advance per character, as a fraction of the font size, for text
/// drawn without a loaded font.
const FALLBACK_ADVANCE: f32 = 0.5;

/// Draws annotations onto page rasters.
#[derive(Clone)]
pub struct CanvasRenderer {
    font: Option<FontArc>,
    stroke_width: u32,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_WIDTH)
    }
}

impl CanvasRenderer {
    /// A renderer without a font; text is drawn as a baseline placeholder.
    pub fn new(stroke_width: u32) -> Self {
        Self {
            font: None,
            stroke_width: stroke_width.max(1),
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    /// Render `annotations` then `in_progress` over a copy of `base`.
    ///
    /// Fails with [`BlattwerkError::RenderNotReady`] when there is no base
    /// raster yet.
    #[instrument(skip_all, fields(annotations = annotations.len(), drafting = in_progress.is_some()))]
    pub fn render(
        &self,
        base: Option<&RgbaImage>,
        annotations: &[Annotation],
        in_progress: Option<&Annotation>,
    ) -> Result<RgbaImage> {
        let base = base.ok_or(BlattwerkError::RenderNotReady)?;
        let mut canvas = base.clone();
        for annotation in annotations.iter().chain(in_progress) {
            self.draw(&mut canvas, annotation);
        }
        debug!(width = canvas.width(), height = canvas.height(), "frame rendered");
        Ok(canvas)
    }

    fn draw(&self, canvas: &mut RgbaImage, annotation: &Annotation) {
        let color = Rgba(annotation.color.to_rgba());
        let anchor = annotation.anchor;
        match &annotation.kind {
            AnnotationKind::Text { text, font_size } => {
                self.draw_text(canvas, text, *font_size, anchor, color);
            }
            AnnotationKind::Rectangle { extent } => {
                let far = anchor.offset(*extent);
                let corners = [
                    anchor,
                    Point::new(far.x, anchor.y),
                    far,
                    Point::new(anchor.x, far.y),
                ];
                for (index, &corner) in corners.iter().enumerate() {
                    let next = corners[(index + 1) % corners.len()];
                    self.stroke_line(canvas, corner, next, color);
                }
            }
            AnnotationKind::Circle { extent } => {
                let (center, radius) = circle_geometry(anchor, *extent);
                for offset in self.stroke_offsets() {
                    draw_ring(canvas, center, radius + offset, color);
                }
            }
            AnnotationKind::Line { extent } => {
                self.stroke_line(canvas, anchor, anchor.offset(*extent), color);
            }
        }
    }

    /// Draw `text` with its baseline origin at `anchor`.
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        font_size: f32,
        anchor: Point,
        color: Rgba<u8>,
    ) {
        match &self.font {
            Some(font) => {
                let scale = PxScale::from(font_size);
                // imageproc positions text by its top edge.
                let ascent = font.as_scaled(scale).ascent();
                let top = (anchor.y - ascent).round() as i32;
                draw_text_mut(canvas, color, anchor.x.round() as i32, top, scale, font, text);
            }
            None => {
                let advance = text.chars().count() as f32 * font_size * FALLBACK_ADVANCE;
                let end = Point::new(anchor.x + advance, anchor.y);
                draw_clipped_segment(canvas, anchor, end, color);
            }
        }
    }

    /// Parallel copies of a segment, one pixel apart, across the stroke width.
    fn stroke_line(&self, canvas: &mut RgbaImage, from: Point, to: Point, color: Rgba<u8>) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let length = dx.hypot(dy);
        let normal = if length > 0.0 {
            (-dy / length, dx / length)
        } else {
            (0.0, 0.0)
        };
        for offset in self.stroke_offsets() {
            let (nx, ny) = (normal.0 * offset, normal.1 * offset);
            draw_clipped_segment(
                canvas,
                Point::new(from.x + nx, from.y + ny),
                Point::new(to.x + nx, to.y + ny),
                color,
            );
        }
    }

    /// Whole-pixel offsets covering the stroke width, always including zero.
    fn stroke_offsets(&self) -> impl Iterator<Item = f32> {
        let low = ((self.stroke_width - 1) / 2) as f32;
        (0..self.stroke_width).map(move |step| step as f32 - low)
    }
}

// -- Clipping -----------------------------------------------------------------

/// Draw the part of `from`..`to` that can touch `canvas`. Work is bounded by
/// the canvas size however far the endpoints lie outside it.
fn draw_clipped_segment(canvas: &mut RgbaImage, from: Point, to: Point, color: Rgba<u8>) {
    let bounds = (-1.0, -1.0, f64::from(canvas.width()), f64::from(canvas.height()));
    let from = (f64::from(from.x), f64::from(from.y));
    let to = (f64::from(to.x), f64::from(to.y));
    if let Some((a, b)) = clip_segment(from, to, bounds) {
        draw_line_segment_mut(canvas, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), color);
    }
}

/// Liang-Barsky clip of a segment against `(x_min, y_min, x_max, y_max)`.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (x_min, y_min, x_max, y_max): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-dx, from.0 - x_min),
        (dx, x_max - from.0),
        (-dy, from.1 - y_min),
        (dy, y_max - from.1),
    ];
    for (p, q) in edges {
        if !(p.is_finite() && q.is_finite()) {
            return None;
        }
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| (from.0 + t * dx, from.1 + t * dy);
    Some((at(t0), at(t1)))
}

/// Outline a circle. Small circles use imageproc's midpoint walk; a circle
/// much larger than the canvas is sampled once per visible column and row
/// instead, and one that cannot cross the canvas is skipped.
fn draw_ring(canvas: &mut RgbaImage, center: Point, radius: f32, color: Rgba<u8>) {
    let (cx, cy, r) = (f64::from(center.x), f64::from(center.y), f64::from(radius).round());
    if !(cx.is_finite() && cy.is_finite() && r >= 0.0) {
        return;
    }
    let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
    let nearest = (cx - cx.clamp(0.0, w)).hypot(cy - cy.clamp(0.0, h));
    let farthest = (cx.max(w - cx)).hypot(cy.max(h - cy));
    if nearest > r + 1.0 || farthest < r - 1.0 {
        return;
    }

    if r <= w + h {
        draw_hollow_circle_mut(canvas, (cx.round() as i32, cy.round() as i32), r as i32, color);
        return;
    }

    let (columns, rows) = canvas.dimensions();
    let mut plot = |x: f64, y: f64| {
        let (x, y) = (x.round(), y.round());
        if (0.0..w).contains(&x) && (0.0..h).contains(&y) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    };
    // Half-chord at offset `d` from the centre, in a form that stays exact
    // for large radii.
    let half_chord = |d: f64| ((r - d) * (r + d)).sqrt();
    for x in 0..columns {
        let d = f64::from(x) - cx;
        if d.abs() <= r {
            let span = half_chord(d);
            plot(f64::from(x), cy - span);
            plot(f64::from(x), cy + span);
        }
    }
    for y in 0..rows {
        let d = f64::from(y) - cy;
        if d.abs() <= r {
            let span = half_chord(d);
            plot(cx - span, f64::from(y));
            plot(cx + span, f64::from(y));
        }
    }
}

// -- Rasters ------------------------------------------------------------------

/// A plain white page to annotate when no rendered page is available.
pub fn blank_page(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(Color::WHITE.to_rgba()))
}

/// Decode PNG, JPEG or any other supported format into an RGBA raster.
pub fn decode_raster(data: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| BlattwerkError::Image(format!("failed to decode image: {err}")))?;
    debug!(width = img.width(), height = img.height(), "base raster decoded");
    Ok(img.to_rgba8())
}

/// Encode a rendered frame as PNG.
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    DynamicImage::ImageRgba8(frame.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| BlattwerkError::Image(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

/// Load a TrueType or OpenType font for text annotations.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path)?;
    FontArc::try_from_vec(data)
        .map_err(|err| BlattwerkError::Font(format!("{}: {err}", path.display())))
}
