//! Point-by-point shape construction
//!
//! Construction rules are plain functions dispatching on [`ShapeKind`]; the
//! polyline being built is caller-held data, so abandoning a shape is just
//! dropping it.

use crate::geometry::{is_closed, is_self_intersecting, ImagePoint};
use crate::measurement::{measure, Measurement};
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Kind of measurable shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Two-point straight segment, measured by length
    Segment,
    /// Open polyline, measured by length
    OpenPolyline,
    /// Polyline closed back to its first point, measured by perimeter
    ClosedPolyline,
    /// Axis-aligned rectangle spanned by two clicks, measured by area
    Rectangle,
    /// Free polygon, measured by area
    Polygon,
}

impl ShapeKind {
    /// Whether this kind is measured by area (as opposed to length)
    pub fn measures_area(&self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::Polygon)
    }

    /// Whether the finished outline is a ring
    pub fn is_ring(&self) -> bool {
        matches!(
            self,
            ShapeKind::ClosedPolyline | ShapeKind::Rectangle | ShapeKind::Polygon
        )
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Segment => "Segment",
            ShapeKind::OpenPolyline => "Polyline",
            ShapeKind::ClosedPolyline => "Closed Polyline",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        }
    }
}

/// Advisory validity of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Valid,
    /// Two non-adjacent edges cross; the area is still reported
    SelfIntersecting,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Corners of the axis-aligned rectangle spanned by `anchor` and `opposite`
///
/// Order: anchor, (opposite.x, anchor.y), opposite, (anchor.x, opposite.y).
pub fn rectangle_corners(anchor: ImagePoint, opposite: ImagePoint) -> [ImagePoint; 4] {
    [
        anchor,
        ImagePoint::new(opposite.x, anchor.y),
        opposite,
        ImagePoint::new(anchor.x, opposite.y),
    ]
}

/// Fold a new point into the polyline under construction
///
/// Returns `true` once the shape is complete on its own (segments after two
/// points, rectangles after the second corner). Polylines and polygons never
/// complete here; an explicit [`finish`] ends them. Repeated clicks on the
/// last point are dropped for those kinds (exact comparison).
pub fn add_point(polyline: &mut Vec<ImagePoint>, new_point: ImagePoint, kind: ShapeKind) -> bool {
    match kind {
        ShapeKind::Segment => {
            polyline.push(new_point);
            polyline.len() >= 2
        }
        ShapeKind::OpenPolyline | ShapeKind::ClosedPolyline | ShapeKind::Polygon => {
            if polyline.last() != Some(&new_point) {
                polyline.push(new_point);
            }
            false
        }
        ShapeKind::Rectangle => match polyline.first().copied() {
            None => {
                polyline.push(new_point);
                false
            }
            Some(anchor) => {
                *polyline = rectangle_corners(anchor, new_point).to_vec();
                true
            }
        },
    }
}

/// Complete construction: ring kinds get their first point appended
///
/// Not idempotent; call exactly once per shape. No-op on an empty polyline.
/// Rectangles stay as four corners and are closed on demand by [`closed_ring`].
pub fn finish(polyline: &mut Vec<ImagePoint>, kind: ShapeKind) {
    let Some(first) = polyline.first().copied() else {
        return;
    };

    match kind {
        ShapeKind::Segment | ShapeKind::OpenPolyline | ShapeKind::Rectangle => {}
        ShapeKind::ClosedPolyline | ShapeKind::Polygon => polyline.push(first),
    }
}

/// The polyline with its first point repeated at the end, unless already closed
pub fn closed_ring(polyline: &[ImagePoint]) -> Cow<'_, [ImagePoint]> {
    if is_closed(polyline) {
        Cow::Borrowed(polyline)
    } else {
        let mut ring = polyline.to_vec();
        ring.push(polyline[0]);
        Cow::Owned(ring)
    }
}

/// Validity of the shape; only polygons can be self-intersecting
pub fn validity(polyline: &[ImagePoint], kind: ShapeKind) -> Validity {
    match kind {
        ShapeKind::Segment
        | ShapeKind::OpenPolyline
        | ShapeKind::ClosedPolyline
        | ShapeKind::Rectangle => Validity::Valid,
        ShapeKind::Polygon => {
            if is_self_intersecting(&closed_ring(polyline)) {
                Validity::SelfIntersecting
            } else {
                Validity::Valid
            }
        }
    }
}

/// A shape under construction
///
/// Owned by whoever drives the current interaction. Dropping it cancels the
/// construction; [`PendingShape::finish`] consumes it so a shape is finished
/// exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingShape {
    kind: ShapeKind,
    polyline: Vec<ImagePoint>,
}

impl PendingShape {
    /// Start an empty shape of the given kind
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            polyline: Vec::new(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Points collected so far
    pub fn points(&self) -> &[ImagePoint] {
        &self.polyline
    }

    pub fn is_empty(&self) -> bool {
        self.polyline.is_empty()
    }

    /// Add a clicked point; returns `true` when the shape completed itself
    pub fn push(&mut self, point: ImagePoint) -> bool {
        let complete = add_point(&mut self.polyline, point, self.kind);
        log::debug!(
            "{} construction: {} point(s), complete={}",
            self.kind.name(),
            self.polyline.len(),
            complete
        );
        complete
    }

    /// Live measurement of the shape as drawn so far
    pub fn measurement(&self) -> Measurement {
        measure(&self.polyline, self.kind)
    }

    /// Live validity of the shape as drawn so far
    pub fn validity(&self) -> Validity {
        validity(&self.polyline, self.kind)
    }

    /// Close the shape according to its kind and turn it into a [`Shape`]
    pub fn finish(mut self) -> Shape {
        finish(&mut self.polyline, self.kind);
        Shape::new(self.kind, self.polyline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    #[test]
    fn test_segment_completes_after_two_points() {
        let mut polyline = Vec::new();
        assert!(!add_point(&mut polyline, p(0.0, 0.0), ShapeKind::Segment));
        assert!(add_point(&mut polyline, p(3.0, 4.0), ShapeKind::Segment));
        assert_eq!(polyline, vec![p(0.0, 0.0), p(3.0, 4.0)]);
    }

    #[test]
    fn test_segment_accepts_duplicate_points() {
        let mut polyline = Vec::new();
        add_point(&mut polyline, p(1.0, 1.0), ShapeKind::Segment);
        assert!(add_point(&mut polyline, p(1.0, 1.0), ShapeKind::Segment));
        assert_eq!(polyline.len(), 2);
    }

    #[test]
    fn test_polyline_kinds_suppress_duplicates_and_never_complete() {
        for kind in [
            ShapeKind::OpenPolyline,
            ShapeKind::ClosedPolyline,
            ShapeKind::Polygon,
        ] {
            let mut polyline = Vec::new();
            assert!(!add_point(&mut polyline, p(0.0, 0.0), kind));
            assert!(!add_point(&mut polyline, p(0.0, 0.0), kind));
            assert!(!add_point(&mut polyline, p(5.0, 0.0), kind));
            assert!(!add_point(&mut polyline, p(5.0, 0.0), kind));
            // Returning to an earlier, non-last point is allowed
            assert!(!add_point(&mut polyline, p(0.0, 0.0), kind));
            assert_eq!(polyline, vec![p(0.0, 0.0), p(5.0, 0.0), p(0.0, 0.0)], "{kind:?}");
        }
    }

    #[test]
    fn test_rectangle_from_two_corners() {
        let mut polyline = Vec::new();
        assert!(!add_point(&mut polyline, p(1.0, 2.0), ShapeKind::Rectangle));
        assert_eq!(polyline, vec![p(1.0, 2.0)]);

        assert!(add_point(&mut polyline, p(5.0, 7.0), ShapeKind::Rectangle));
        assert_eq!(
            polyline,
            vec![p(1.0, 2.0), p(5.0, 2.0), p(5.0, 7.0), p(1.0, 7.0)]
        );
    }

    #[test]
    fn test_finish_closes_ring_kinds() {
        for kind in [ShapeKind::ClosedPolyline, ShapeKind::Polygon] {
            let mut polyline = vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0)];
            finish(&mut polyline, kind);
            assert_eq!(polyline.len(), 4);
            assert_eq!(polyline.last(), Some(&p(0.0, 0.0)));

            let mut empty = Vec::new();
            finish(&mut empty, kind);
            assert!(empty.is_empty());
        }
    }

    #[test]
    fn test_finish_is_noop_for_open_kinds() {
        for kind in [
            ShapeKind::Segment,
            ShapeKind::OpenPolyline,
            ShapeKind::Rectangle,
        ] {
            let mut polyline = vec![p(0.0, 0.0), p(4.0, 0.0)];
            finish(&mut polyline, kind);
            assert_eq!(polyline.len(), 2, "{kind:?}");
        }
    }

    #[test]
    fn test_closed_ring() {
        let open = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let ring = closed_ring(&open);
        assert_eq!(ring.len(), 4);
        assert!(matches!(ring, Cow::Owned(_)));

        let closed = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 0.0)];
        assert!(matches!(closed_ring(&closed), Cow::Borrowed(_)));
        assert!(closed_ring(&[]).is_empty());
    }

    #[test]
    fn test_validity() {
        let bowtie = [p(0.0, 0.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)];
        assert_eq!(validity(&bowtie, ShapeKind::Polygon), Validity::SelfIntersecting);
        assert_eq!(validity(&bowtie, ShapeKind::ClosedPolyline), Validity::Valid);
        assert_eq!(validity(&bowtie[..4], ShapeKind::Polygon), Validity::SelfIntersecting);

        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0)];
        assert_eq!(validity(&square, ShapeKind::Polygon), Validity::Valid);
        assert_eq!(validity(&[], ShapeKind::Polygon), Validity::Valid);
    }

    #[test]
    fn test_pending_shape_rectangle_measurement() {
        let mut pending = PendingShape::new(ShapeKind::Rectangle);
        assert!(pending.is_empty());
        assert!(!pending.push(p(0.0, 0.0)));
        assert_eq!(pending.measurement(), Measurement::Area(0.0));
        assert!(pending.push(p(4.0, 3.0)));
        assert_eq!(pending.measurement(), Measurement::Area(12.0));

        let shape = pending.finish();
        assert_eq!(shape.kind(), ShapeKind::Rectangle);
        assert_eq!(shape.points().len(), 4);
        assert_eq!(shape.measurement(), Measurement::Area(12.0));
    }

    #[test]
    fn test_pending_polygon_finish_closes() {
        let mut pending = PendingShape::new(ShapeKind::Polygon);
        for point in [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0), p(0.0, 3.0)] {
            assert!(!pending.push(point));
        }
        assert_eq!(pending.validity(), Validity::Valid);

        let shape = pending.finish();
        assert_eq!(shape.points().len(), 5);
        assert_eq!(shape.points().first(), shape.points().last());
        assert_eq!(shape.measurement(), Measurement::Area(12.0));
    }

    #[test]
    fn test_kind_properties() {
        assert!(ShapeKind::Rectangle.measures_area());
        assert!(ShapeKind::Polygon.measures_area());
        assert!(!ShapeKind::ClosedPolyline.measures_area());
        assert!(ShapeKind::ClosedPolyline.is_ring());
        assert!(!ShapeKind::OpenPolyline.is_ring());
    }
}
