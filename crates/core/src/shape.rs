//! Finished measurement shapes
//!
//! A [`Shape`] owns its kind (fixed) and its polyline (editable by dragging).
//! Measurement and validity are derived from the polyline on every call.

use crate::builder::{closed_ring, validity, ShapeKind, Validity};
use crate::geometry::{ImagePoint, LabelRect};
use crate::measurement::{measure, Measurement};
use serde::{Deserialize, Serialize};

/// Unique identifier for a shape
///
/// Generated using UUID v4; stable across save/load.
pub type ShapeId = uuid::Uuid;

/// Text label attached to a shape
///
/// Laid out by the renderer; the core only needs its bounding box for
/// hit testing and dragging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    /// Bounding rectangle in image space
    pub bounds: LabelRect,
}

impl Label {
    pub fn new(text: impl Into<String>, bounds: LabelRect) -> Self {
        Self {
            text: text.into(),
            bounds,
        }
    }
}

/// A measurable shape on the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    polyline: Vec<ImagePoint>,
    #[serde(default)]
    label: Option<Label>,
}

impl Shape {
    /// Create a shape with a generated ID from an already finished polyline
    pub fn new(kind: ShapeKind, polyline: Vec<ImagePoint>) -> Self {
        Self::with_id(ShapeId::new_v4(), kind, polyline)
    }

    /// Create a shape with a specific ID (for deserialization)
    pub fn with_id(id: ShapeId, kind: ShapeKind, polyline: Vec<ImagePoint>) -> Self {
        Self {
            id,
            kind,
            polyline,
            label: None,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The stored polyline (finished rings include the closing point)
    pub fn points(&self) -> &[ImagePoint] {
        &self.polyline
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn set_label(&mut self, label: Option<Label>) {
        self.label = label;
    }

    /// Current measurement in pixel units
    pub fn measurement(&self) -> Measurement {
        measure(&self.polyline, self.kind)
    }

    /// Current validity
    pub fn validity(&self) -> Validity {
        validity(&self.polyline, self.kind)
    }

    /// Distinct vertices (the closing duplicate of a ring is left out)
    pub fn vertices(&self) -> &[ImagePoint] {
        let closed_duplicate = matches!(
            self.kind,
            ShapeKind::ClosedPolyline | ShapeKind::Polygon
        ) && self.polyline.len() > 1
            && self.polyline.first() == self.polyline.last();

        if closed_duplicate {
            &self.polyline[..self.polyline.len() - 1]
        } else {
            &self.polyline
        }
    }

    /// The outline used for body hit testing
    ///
    /// Ring kinds are closed (rectangles are stored as four corners); open
    /// kinds are returned as stored.
    pub fn outline(&self) -> Vec<ImagePoint> {
        if self.kind.is_ring() && !self.polyline.is_empty() {
            closed_ring(&self.polyline).into_owned()
        } else {
            self.polyline.clone()
        }
    }

    /// Move one distinct vertex, keeping the kind's structure intact
    ///
    /// Moving the first vertex of a ring also moves its closing point; moving
    /// a rectangle corner drags both neighbouring corners so the rectangle
    /// stays axis-aligned. Returns `false` when `index` is out of range.
    pub fn set_vertex(&mut self, index: usize, point: ImagePoint) -> bool {
        if index >= self.vertices().len() {
            return false;
        }

        if self.kind == ShapeKind::Rectangle && self.polyline.len() == 4 {
            // Corner edges alternate horizontal (0-1, 2-3) and vertical (1-2, 3-0)
            let (same_y, same_x) = if index % 2 == 0 {
                (index + 1, (index + 3) % 4)
            } else {
                (index - 1, (index + 1) % 4)
            };
            self.polyline[index] = point;
            self.polyline[same_y].y = point.y;
            self.polyline[same_x].x = point.x;
            return true;
        }

        let closes_ring = self.vertices().len() != self.polyline.len();
        self.polyline[index] = point;
        if index == 0 && closes_ring {
            let last = self.polyline.len() - 1;
            self.polyline[last] = point;
        }
        true
    }

    /// Translate every vertex by (dx, dy)
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let delta = ImagePoint::new(dx, dy);
        for point in &mut self.polyline {
            *point = *point + delta;
        }
    }

    /// Move the label so that its top-left corner is at `top_left`
    ///
    /// Returns `false` when the shape has no label.
    pub fn move_label(&mut self, top_left: ImagePoint) -> bool {
        match self.label.as_mut() {
            Some(label) => {
                label.bounds = label.bounds.moved_to(top_left);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PendingShape;

    fn p(x: f64, y: f64) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    fn rectangle(a: ImagePoint, b: ImagePoint) -> Shape {
        let mut pending = PendingShape::new(ShapeKind::Rectangle);
        pending.push(a);
        pending.push(b);
        pending.finish()
    }

    fn polygon(points: &[ImagePoint]) -> Shape {
        let mut pending = PendingShape::new(ShapeKind::Polygon);
        for point in points {
            pending.push(*point);
        }
        pending.finish()
    }

    #[test]
    fn test_vertices_skip_closing_point() {
        let shape = polygon(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0)]);
        assert_eq!(shape.points().len(), 4);
        assert_eq!(shape.vertices().len(), 3);

        let open = Shape::new(ShapeKind::OpenPolyline, vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0)]);
        assert_eq!(open.vertices().len(), 3);
    }

    #[test]
    fn test_outline_closes_rectangle() {
        let shape = rectangle(p(0.0, 0.0), p(4.0, 3.0));
        let outline = shape.outline();
        assert_eq!(outline.len(), 5);
        assert_eq!(outline.first(), outline.last());

        let segment = Shape::new(ShapeKind::Segment, vec![p(0.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(segment.outline().len(), 2);
    }

    #[test]
    fn test_set_vertex_moves_closing_point() {
        let mut shape = polygon(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0)]);
        assert!(shape.set_vertex(0, p(0.0, 3.0)));
        assert_eq!(shape.points()[0], p(0.0, 3.0));
        assert_eq!(shape.points()[3], p(0.0, 3.0));
        assert_eq!(shape.measurement(), Measurement::Area(6.0));
    }

    #[test]
    fn test_set_vertex_out_of_range() {
        let mut shape = polygon(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0)]);
        // Index 3 is the closing duplicate, not a distinct vertex
        assert!(!shape.set_vertex(3, p(9.0, 9.0)));
        assert_eq!(shape.points()[3], p(0.0, 0.0));
    }

    #[test]
    fn test_set_vertex_keeps_rectangle_axis_aligned() {
        let mut shape = rectangle(p(0.0, 0.0), p(4.0, 3.0));
        // Drag the (4, 0) corner to (6, -1)
        assert!(shape.set_vertex(1, p(6.0, -1.0)));
        assert_eq!(
            shape.points(),
            &[p(0.0, -1.0), p(6.0, -1.0), p(6.0, 3.0), p(0.0, 3.0)]
        );
        assert_eq!(shape.measurement(), Measurement::Area(24.0));

        assert!(shape.set_vertex(3, p(1.0, 5.0)));
        assert_eq!(
            shape.points(),
            &[p(1.0, -1.0), p(6.0, -1.0), p(6.0, 5.0), p(1.0, 5.0)]
        );
    }

    #[test]
    fn test_polygon_becomes_self_intersecting_after_edit() {
        let mut shape = polygon(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]);
        assert_eq!(shape.validity(), Validity::Valid);
        shape.set_vertex(1, p(1.0, 1.0));
        shape.set_vertex(2, p(1.0, 0.0));
        assert_eq!(shape.validity(), Validity::SelfIntersecting);
    }

    #[test]
    fn test_clicking_back_on_start_keeps_duplicate_vertex() {
        // Only the previous point is deduplicated, so the start point is
        // stored again before the closing point
        let mut shape = polygon(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 0.0)]);
        assert_eq!(shape.points().len(), 5);
        assert_eq!(shape.vertices().len(), 4);
        assert_eq!(shape.vertices()[3], shape.vertices()[0]);
        assert_eq!(shape.measurement(), Measurement::Area(50.0));
        // Edges 0 and 2 touch at the repeated start point
        assert_eq!(shape.validity(), Validity::SelfIntersecting);

        // Vertex 3 is independent of vertex 0 and stays behind
        assert!(shape.set_vertex(0, p(-5.0, 5.0)));
        assert_eq!(
            shape.points(),
            &[p(-5.0, 5.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 0.0), p(-5.0, 5.0)]
        );
        assert_eq!(shape.measurement(), Measurement::Area(25.0));
        assert_eq!(shape.validity(), Validity::SelfIntersecting);
    }

    #[test]
    fn test_translate() {
        let mut shape = Shape::new(ShapeKind::Segment, vec![p(0.0, 0.0), p(3.0, 4.0)]);
        shape.translate(1.0, -1.0);
        assert_eq!(shape.points(), &[p(1.0, -1.0), p(4.0, 3.0)]);
        assert_eq!(shape.measurement(), Measurement::Length(5.0));
    }

    #[test]
    fn test_label_move() {
        let mut shape = Shape::new(ShapeKind::Segment, vec![p(0.0, 0.0), p(3.0, 4.0)]);
        assert!(!shape.move_label(p(1.0, 1.0)));

        shape.set_label(Some(Label::new("5 px", LabelRect::new(0.0, 0.0, 20.0, 8.0))));
        assert!(shape.move_label(p(10.0, 12.0)));
        let bounds = shape.label().map(|l| l.bounds);
        assert_eq!(bounds, Some(LabelRect::new(10.0, 12.0, 20.0, 8.0)));
    }

    #[test]
    fn test_shape_ids_are_unique() {
        let a = Shape::new(ShapeKind::Segment, Vec::new());
        let b = Shape::new(ShapeKind::Segment, Vec::new());
        assert_ne!(a.id(), b.id());
    }
}
