//! Scalar geometry primitives in image pixel space
//!
//! Pure, stateless functions over points and polylines. A closed polygon is a
//! polyline whose last point repeats its first point; area and
//! self-intersection checks assert that invariant instead of enforcing it.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Point in image pixel space
///
/// Uses the raster coordinate system:
/// - Origin (0, 0) at the top-left corner of the image
/// - X increases to the right
/// - Y increases downward
/// - Units are pixels (sub-pixel positions allowed)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    /// Create a new image point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &ImagePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Length of this point read as a vector from the origin
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 2D cross product (z component of the 3D cross product)
    pub fn cross(&self, other: &ImagePoint) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for ImagePoint {
    type Output = ImagePoint;

    fn add(self, rhs: ImagePoint) -> ImagePoint {
        ImagePoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ImagePoint {
    type Output = ImagePoint;

    fn sub(self, rhs: ImagePoint) -> ImagePoint {
        ImagePoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for ImagePoint {
    type Output = ImagePoint;

    fn mul(self, rhs: f64) -> ImagePoint {
        ImagePoint::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle in image space (label bounding boxes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRect {
    /// Create a new rectangle from its top-left corner and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    pub fn top_left(&self) -> ImagePoint {
        ImagePoint::new(self.x, self.y)
    }

    /// Same size, moved so that its top-left corner is at `top_left`
    pub fn moved_to(&self, top_left: ImagePoint) -> Self {
        Self::new(top_left.x, top_left.y, self.width, self.height)
    }

    /// The rectangle as a closed polygon
    ///
    /// Corner order: top-left, top-right, bottom-right, bottom-left, top-left.
    pub fn to_polygon(&self) -> Vec<ImagePoint> {
        let left = self.x;
        let top = self.y;
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        vec![
            ImagePoint::new(left, top),
            ImagePoint::new(right, top),
            ImagePoint::new(right, bottom),
            ImagePoint::new(left, bottom),
            ImagePoint::new(left, top),
        ]
    }
}

/// How the infinite extensions of two segments meet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineIntersection {
    /// Parallel lines, or at least one degenerate segment
    None,
    /// The crossing lies within both segments (endpoints included)
    Bounded(ImagePoint),
    /// The lines cross outside at least one of the segments
    Unbounded(ImagePoint),
}

/// Classify the intersection of lines a-b and c-d
pub fn intersect_lines(
    a: ImagePoint,
    b: ImagePoint,
    c: ImagePoint,
    d: ImagePoint,
) -> LineIntersection {
    let ab = b - a;
    let dc = c - d;
    let ca = a - c;

    let denominator = ab.y * dc.x - ab.x * dc.y;
    if denominator == 0.0 || !denominator.is_finite() {
        return LineIntersection::None;
    }
    let reciprocal = 1.0 / denominator;

    let along_ab = (dc.y * ca.x - dc.x * ca.y) * reciprocal;
    let point = a + ab * along_ab;
    if !(0.0..=1.0).contains(&along_ab) {
        return LineIntersection::Unbounded(point);
    }

    let along_cd = (ab.x * ca.y - ab.y * ca.x) * reciprocal;
    if !(0.0..=1.0).contains(&along_cd) {
        return LineIntersection::Unbounded(point);
    }

    LineIntersection::Bounded(point)
}

/// Euclidean distance between two points
pub fn distance(p: ImagePoint, q: ImagePoint) -> f64 {
    p.distance_to(&q)
}

/// Sum of consecutive-pair distances; 0 for fewer than 2 points
pub fn polyline_length(polyline: &[ImagePoint]) -> f64 {
    polyline.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Half the cross product of (b - a) and (c - a); positive when a-b-c turns left
pub fn signed_triangle_area(a: ImagePoint, b: ImagePoint, c: ImagePoint) -> f64 {
    (b - a).cross(&(c - a)) / 2.0
}

/// Whether the first and last points of `polygon` coincide (or it is empty)
pub fn is_closed(polygon: &[ImagePoint]) -> bool {
    polygon.is_empty() || polygon.first() == polygon.last()
}

fn assert_closed(polygon: &[ImagePoint]) {
    assert!(
        is_closed(polygon),
        "polygon is not closed: first point must equal last point"
    );
}

/// Area of a closed polygon, triangulated as a fan from the first vertex
///
/// # Panics
/// If the polygon is not closed.
pub fn polygon_area(polygon: &[ImagePoint]) -> f64 {
    assert_closed(polygon);
    let mut area = 0.0;
    for i in 1..polygon.len().saturating_sub(2) {
        area += signed_triangle_area(polygon[0], polygon[i], polygon[i + 1]);
    }
    area.abs()
}

/// Whether the bounded segments a-b and c-d intersect
pub fn segments_cross(a: ImagePoint, b: ImagePoint, c: ImagePoint, d: ImagePoint) -> bool {
    matches!(intersect_lines(a, b, c, d), LineIntersection::Bounded(_))
}

/// Whether any two non-adjacent edges of a closed polygon cross
///
/// Edge pairs that share a vertex, including the wrap-around pair, are
/// skipped. Pairwise O(n²) scan.
///
/// # Panics
/// If the polygon is not closed.
pub fn is_self_intersecting(polygon: &[ImagePoint]) -> bool {
    assert_closed(polygon);
    let n = polygon.len().saturating_sub(1);
    for i1 in 0..n {
        let i2 = (i1 + 1) % n;
        for j1 in 0..n {
            let j2 = (j1 + 1) % n;
            if i1 != j1
                && i1 != j2
                && i2 != j1
                && segments_cross(polygon[i1], polygon[i2], polygon[j1], polygon[j2])
            {
                return true;
            }
        }
    }
    false
}

/// Distance from `point` to the closest point of the bounded segment
///
/// A perpendicular probe through `point` is intersected with the segment's
/// line. When the foot of the perpendicular falls on the segment the distance
/// to it is returned, otherwise the distance to the nearer endpoint.
pub fn point_to_segment_distance(point: ImagePoint, start: ImagePoint, end: ImagePoint) -> f64 {
    let direction = end - start;
    let length = direction.length();
    if length == 0.0 {
        return point.distance_to(&start);
    }

    // Probe half-length must exceed the point's distance to the segment's line.
    let reach = (point.distance_to(&start) + point.distance_to(&end)) / length + 1.0;
    let normal = ImagePoint::new(direction.y, -direction.x) * reach;

    match intersect_lines(start, end, point - normal, point + normal) {
        LineIntersection::Bounded(projection) => point.distance_to(&projection),
        LineIntersection::Unbounded(_) => point.distance_to(&start).min(point.distance_to(&end)),
        LineIntersection::None => {
            unreachable!("perpendicular probe cannot be parallel to a non-degenerate segment")
        }
    }
}

/// Minimum segment distance over all edges; `+inf` for fewer than 2 points
pub fn point_to_polyline_distance(point: ImagePoint, polyline: &[ImagePoint]) -> f64 {
    polyline
        .windows(2)
        .map(|w| point_to_segment_distance(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Even-odd (crossing-number) containment test
///
/// The ring is treated as implicitly closed; a repeated closing vertex adds
/// a zero-length edge that never toggles the result.
pub fn contains_point_even_odd(polygon: &[ImagePoint], point: ImagePoint) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let crossing_x = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Zero inside the closed polygon, otherwise the distance to its boundary
pub fn point_to_polygon_distance(point: ImagePoint, polygon: &[ImagePoint]) -> f64 {
    if contains_point_even_odd(polygon, point) {
        0.0
    } else {
        point_to_polyline_distance(point, polygon)
    }
}
