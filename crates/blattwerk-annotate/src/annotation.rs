// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation values — immutable vector overlays placed on a page raster.

use blattwerk_core::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an annotation within an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub Uuid);

impl AnnotationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A canvas position in pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, extent: Extent) -> Self {
        Self::new(self.x + extent.width, self.y + extent.height)
    }
}

/// Signed size of a shape. Negative values mean the shape was dragged
/// leftward or upward from its anchor and are kept as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent spanning from `from` to `to`.
    pub fn between(from: Point, to: Point) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    Text { text: String, font_size: f32 },
    Rectangle { extent: Extent },
    Circle { extent: Extent },
    Line { extent: Extent },
}

/// The shape tools a drag gesture can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeTool {
    Rectangle,
    Circle,
    Line,
}

impl ShapeTool {
    pub fn kind(&self, extent: Extent) -> AnnotationKind {
        match self {
            Self::Rectangle => AnnotationKind::Rectangle { extent },
            Self::Circle => AnnotationKind::Circle { extent },
            Self::Line => AnnotationKind::Line { extent },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Minted fresh when absent from the serialized form.
    #[serde(default)]
    pub id: AnnotationId,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    pub anchor: Point,
    pub color: Color,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, anchor: Point, color: Color) -> Self {
        Self {
            id: AnnotationId::new(),
            kind,
            anchor,
            color,
        }
    }

    pub fn text(text: impl Into<String>, font_size: f32, anchor: Point, color: Color) -> Self {
        Self::new(
            AnnotationKind::Text {
                text: text.into(),
                font_size,
            },
            anchor,
            color,
        )
    }

    pub fn shape(tool: ShapeTool, anchor: Point, extent: Extent, color: Color) -> Self {
        Self::new(tool.kind(extent), anchor, color)
    }

    /// Extent of a shape annotation; `None` for text.
    pub fn extent(&self) -> Option<Extent> {
        match &self.kind {
            AnnotationKind::Text { .. } => None,
            AnnotationKind::Rectangle { extent }
            | AnnotationKind::Circle { extent }
            | AnnotationKind::Line { extent } => Some(*extent),
        }
    }

    /// Same annotation with a new extent; text is returned unchanged.
    pub fn with_extent(&self, extent: Extent) -> Self {
        let kind = match &self.kind {
            AnnotationKind::Text { .. } => self.kind.clone(),
            AnnotationKind::Rectangle { .. } => AnnotationKind::Rectangle { extent },
            AnnotationKind::Circle { .. } => AnnotationKind::Circle { extent },
            AnnotationKind::Line { .. } => AnnotationKind::Line { extent },
        };
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Center and radius of a circle annotation's stroke.
///
/// The radius is half the bounding box diagonal, so for a non-square drag the
/// circle extends past the box it was dragged out of.
pub fn circle_geometry(anchor: Point, extent: Extent) -> (Point, f32) {
    let center = Point::new(
        anchor.x + extent.width / 2.0,
        anchor.y + extent.height / 2.0,
    );
    let radius = extent.width.hypot(extent.height) / 2.0;
    (center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(AnnotationId::new(), AnnotationId::new());
    }

    #[test]
    fn circle_uses_half_diagonal() {
        let (center, radius) = circle_geometry(Point::new(10.0, 20.0), Extent::new(60.0, 80.0));
        assert_eq!(center, Point::new(40.0, 60.0));
        assert_eq!(radius, 50.0);
    }

    #[test]
    fn circle_with_negative_extent_keeps_direction() {
        let (center, radius) = circle_geometry(Point::new(100.0, 100.0), Extent::new(-30.0, -40.0));
        assert_eq!(center, Point::new(85.0, 80.0));
        assert_eq!(radius, 25.0);
    }

    #[test]
    fn with_extent_keeps_identity() {
        let shape = Annotation::shape(
            ShapeTool::Line,
            Point::new(0.0, 0.0),
            Extent::default(),
            Color::BLACK,
        );
        let dragged = shape.with_extent(Extent::new(-5.0, 7.0));
        assert_eq!(dragged.id, shape.id);
        assert_eq!(dragged.extent(), Some(Extent::new(-5.0, 7.0)));
    }

    #[test]
    fn serialises_with_type_tag() {
        let note = Annotation::text("hi", 16.0, Point::new(1.0, 2.0), Color::BLUE);
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["color"], "#0000ff");
        let back: Annotation = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }
}
