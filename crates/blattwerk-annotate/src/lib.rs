// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-annotate — Annotation overlays for Blattwerk.
//
// Provides the annotation values, a branch-truncating undo/redo history of
// annotation-list snapshots, and a renderer that redraws the full canvas from
// a base page raster on every change.

pub mod annotation;
pub mod history;
pub mod render;
pub mod session;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, Extent, Point, ShapeTool};
pub use history::{History, HistoryStep};
pub use render::CanvasRenderer;
pub use session::{EditorSession, ToolSettings};
