// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor session — ties a page raster, the undo history and the renderer
// together behind gesture-level calls. Every state change returns a freshly
// rendered frame.

use blattwerk_core::error::Result;
use blattwerk_core::{AppConfig, Color};
use image::RgbaImage;
use tracing::{debug, info};

use crate::annotation::{Annotation, AnnotationId, Extent, Point, ShapeTool};
use crate::history::{History, HistoryStep};
use crate::render::{self, CanvasRenderer};

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 48.0;

/// Colour and font size applied to new annotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub color: Color,
    font_size: f32,
}

impl ToolSettings {
    pub fn new(color: Color, font_size: f32) -> Self {
        let mut settings = Self {
            color,
            font_size: MIN_FONT_SIZE,
        };
        settings.set_font_size(font_size);
        settings
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Set the font size, clamped to the supported range.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = if size.is_finite() {
            size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            MIN_FONT_SIZE
        };
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::new(Color::BLACK, 16.0)
    }
}

/// Annotation editing over one page.
pub struct EditorSession {
    base: Option<RgbaImage>,
    history: History,
    renderer: CanvasRenderer,
    settings: ToolSettings,
    drafting: Option<Annotation>,
}

impl EditorSession {
    pub fn new(base: Option<RgbaImage>, renderer: CanvasRenderer, settings: ToolSettings) -> Self {
        Self {
            base,
            history: History::new(),
            renderer,
            settings,
            drafting: None,
        }
    }

    /// A session over a blank canvas sized and styled from `config`.
    pub fn from_config(config: &AppConfig, renderer: CanvasRenderer) -> Self {
        let base = render::blank_page(config.canvas_width, config.canvas_height);
        let settings = ToolSettings::new(config.default_color, config.default_font_size);
        info!(
            width = config.canvas_width,
            height = config.canvas_height,
            "editor opened on blank canvas"
        );
        Self::new(Some(base), renderer, settings)
    }

    /// Install the page raster once it becomes available.
    pub fn set_base(&mut self, base: RgbaImage) -> Result<RgbaImage> {
        self.base = Some(base);
        self.frame()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.history.current()
    }

    pub fn is_drafting(&self) -> bool {
        self.drafting.is_some()
    }

    // -- Gestures -----------------------------------------------------------------

    /// Commit a text annotation at `at`; blank text is ignored.
    pub fn place_text(&mut self, at: Point, text: &str) -> Result<RgbaImage> {
        if text.trim().is_empty() {
            debug!("empty text ignored");
            return self.frame();
        }
        let annotation = Annotation::text(text, self.settings.font_size, at, self.settings.color);
        self.history.push(annotation);
        self.frame()
    }

    /// Record a prepared annotation without rendering a frame. An id already
    /// present in the current view is replaced with a fresh one.
    pub fn commit(&mut self, mut annotation: Annotation) -> AnnotationId {
        if self.annotations().iter().any(|placed| placed.id == annotation.id) {
            debug!(id = %annotation.id, "duplicate annotation id replaced");
            annotation.id = AnnotationId::new();
        }
        let id = annotation.id;
        self.history.push(annotation);
        id
    }

    /// Start dragging out a shape at `at`. Replaces any unfinished draft.
    pub fn begin_shape(&mut self, tool: ShapeTool, at: Point) -> Result<RgbaImage> {
        self.drafting = Some(Annotation::shape(
            tool,
            at,
            Extent::default(),
            self.settings.color,
        ));
        self.frame()
    }

    /// Stretch the current draft so its far corner sits at `to`.
    pub fn drag_to(&mut self, to: Point) -> Result<RgbaImage> {
        if let Some(draft) = self.drafting.as_mut() {
            *draft = draft.with_extent(Extent::between(draft.anchor, to));
        }
        self.frame()
    }

    /// Commit the current draft, if any.
    pub fn finish_shape(&mut self) -> Result<RgbaImage> {
        if let Some(draft) = self.drafting.take() {
            self.history.push(draft);
        }
        self.frame()
    }

    /// Drop the current draft without recording it.
    pub fn cancel_shape(&mut self) -> Result<RgbaImage> {
        self.drafting = None;
        self.frame()
    }

    pub fn undo(&mut self) -> Result<(HistoryStep, RgbaImage)> {
        let step = self.history.undo();
        Ok((step, self.frame()?))
    }

    pub fn redo(&mut self) -> Result<(HistoryStep, RgbaImage)> {
        let step = self.history.redo();
        Ok((step, self.frame()?))
    }

    // -- Output -------------------------------------------------------------------

    /// Render the current view plus any draft.
    pub fn frame(&self) -> Result<RgbaImage> {
        self.renderer.render(
            self.base.as_ref(),
            self.history.current(),
            self.drafting.as_ref(),
        )
    }

    /// The committed view, without any draft, as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        let frame = self
            .renderer
            .render(self.base.as_ref(), self.history.current(), None)?;
        render::encode_png(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use blattwerk_core::error::BlattwerkError;
    use image::Rgba;

    fn session() -> EditorSession {
        EditorSession::new(
            Some(render::blank_page(100, 100)),
            CanvasRenderer::new(1),
            ToolSettings::default(),
        )
    }

    #[test]
    fn font_size_is_clamped() {
        let mut settings = ToolSettings::new(Color::BLACK, 4.0);
        assert_eq!(settings.font_size(), MIN_FONT_SIZE);
        settings.set_font_size(100.0);
        assert_eq!(settings.font_size(), MAX_FONT_SIZE);
        settings.set_font_size(f32::NAN);
        assert_eq!(settings.font_size(), MIN_FONT_SIZE);
    }

    #[test]
    fn empty_text_is_not_committed() {
        let mut editor = session();
        editor.place_text(Point::new(5.0, 5.0), "   ").unwrap();
        assert!(editor.history().is_empty());
    }

    #[test]
    fn drag_gesture_commits_once() {
        let mut editor = session();
        editor.begin_shape(ShapeTool::Line, Point::new(10.0, 50.0)).unwrap();
        editor.drag_to(Point::new(30.0, 50.0)).unwrap();
        let frame = editor.drag_to(Point::new(60.0, 50.0)).unwrap();
        assert!(editor.history().is_empty());
        assert_eq!(frame.get_pixel(50, 50), &Rgba(Color::BLACK.to_rgba()));

        editor.finish_shape().unwrap();
        assert_eq!(editor.history().len(), 1);
        match &editor.annotations()[0].kind {
            AnnotationKind::Line { extent } => assert_eq!(*extent, Extent::new(50.0, 0.0)),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn cancelled_draft_leaves_no_trace() {
        let mut editor = session();
        editor.begin_shape(ShapeTool::Rectangle, Point::new(10.0, 10.0)).unwrap();
        editor.drag_to(Point::new(40.0, 40.0)).unwrap();
        let frame = editor.cancel_shape().unwrap();
        assert!(editor.history().is_empty());
        assert_eq!(frame, render::blank_page(100, 100));
    }

    #[test]
    fn undo_redo_rerender() {
        let mut editor = session();
        editor.begin_shape(ShapeTool::Line, Point::new(0.0, 20.0)).unwrap();
        editor.drag_to(Point::new(90.0, 20.0)).unwrap();
        editor.finish_shape().unwrap();

        let (step, frame) = editor.undo().unwrap();
        assert_eq!(step, HistoryStep::Moved);
        assert_eq!(frame, render::blank_page(100, 100));

        let (step, frame) = editor.redo().unwrap();
        assert_eq!(step, HistoryStep::Moved);
        assert_eq!(frame.get_pixel(45, 20), &Rgba(Color::BLACK.to_rgba()));

        let (step, _) = editor.redo().unwrap();
        assert_eq!(step, HistoryStep::AtBoundary);
    }

    #[test]
    fn no_base_means_not_ready_until_set() {
        let mut editor = EditorSession::new(None, CanvasRenderer::default(), ToolSettings::default());
        assert!(matches!(editor.frame(), Err(BlattwerkError::RenderNotReady)));
        assert!(editor.set_base(render::blank_page(10, 10)).is_ok());
    }

    #[test]
    fn text_uses_current_settings() {
        let mut editor = session();
        editor.settings_mut().color = Color::BLUE;
        editor.settings_mut().set_font_size(24.0);
        editor.place_text(Point::new(5.0, 50.0), "hello").unwrap();
        let placed = &editor.annotations()[0];
        assert_eq!(placed.color, Color::BLUE);
        assert!(matches!(
            &placed.kind,
            AnnotationKind::Text { font_size, .. } if *font_size == 24.0
        ));
    }

    #[test]
    fn committed_annotations_undo_individually() {
        let mut editor = session();
        editor.commit(Annotation::shape(
            ShapeTool::Rectangle,
            Point::new(10.0, 10.0),
            Extent::new(20.0, 20.0),
            Color::BLUE,
        ));
        editor.commit(Annotation::text("note", 12.0, Point::new(5.0, 80.0), Color::BLACK));
        assert_eq!(editor.history().len(), 2);

        editor.undo().unwrap();
        assert_eq!(editor.annotations().len(), 1);
        assert!(matches!(editor.annotations()[0].kind, AnnotationKind::Rectangle { .. }));
    }

    #[test]
    fn commits_from_json_without_ids_get_distinct_ids() {
        let json = r##"[
            {"type":"line","extent":{"width":30.0,"height":0.0},"anchor":{"x":5.0,"y":5.0},"color":"#000000"},
            {"type":"line","extent":{"width":30.0,"height":0.0},"anchor":{"x":5.0,"y":9.0},"color":"#000000"}
        ]"##;
        let parsed: Vec<Annotation> = serde_json::from_str(json).unwrap();
        assert_ne!(parsed[0].id, parsed[1].id);

        let mut editor = session();
        let duplicate = parsed[0].clone();
        let first = editor.commit(parsed[0].clone());
        let second = editor.commit(duplicate);
        assert_ne!(first, second);
        assert_eq!(editor.annotations()[0].id, first);
        assert_eq!(editor.annotations()[1].id, second);
    }

    #[test]
    fn export_excludes_draft() {
        let mut editor = session();
        editor.begin_shape(ShapeTool::Line, Point::new(0.0, 20.0)).unwrap();
        editor.drag_to(Point::new(90.0, 20.0)).unwrap();
        let png = editor.export_png().unwrap();
        assert_eq!(render::decode_raster(&png).unwrap(), render::blank_page(100, 100));
    }
}
