//! Cursor hit testing over shape features
//!
//! The resolver is fed candidate features one by one (vertices, labels, shape
//! bodies) and keeps the best-scoring one. A feature scores
//! `max(0, radius - distance)` where the activation radius depends on the
//! feature kind, so small precise targets beat large coarse ones.

use crate::geometry::{
    point_to_polygon_distance, point_to_polyline_distance, ImagePoint, LabelRect,
};
use crate::shape::ShapeId;
use serde::{Deserialize, Serialize};

/// Kind of selectable feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// A single vertex of a shape
    Vertex,
    /// The line of an open (or length-measured) shape
    Polyline,
    /// The filled body of an area shape
    Polygon,
    /// A label's bounding box
    Label,
}

/// Activation radii in image pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Vertex radius (most forgiving: vertices are the smallest targets)
    pub vertex_radius: f64,

    /// Radius around polyline boundaries
    pub polyline_radius: f64,

    /// Radius around polygon boundaries (the interior always scores fully)
    pub polygon_radius: f64,

    /// Radius around label boxes (the interior always scores fully)
    pub label_radius: f64,
}

impl SelectionConfig {
    /// Activation radius for a feature kind
    pub fn radius_for(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Vertex => self.vertex_radius,
            FeatureKind::Polyline => self.polyline_radius,
            FeatureKind::Polygon => self.polygon_radius,
            FeatureKind::Label => self.label_radius,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            vertex_radius: 8.0,
            polyline_radius: 6.0,
            polygon_radius: 2.0,
            label_radius: 2.0,
        }
    }
}

/// Reference to a selected feature
///
/// Holds a [`ShapeId`], never the shape itself; it goes stale when the shape
/// is deleted and must be re-validated against the document after mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Empty,
    /// A whole shape
    Shape { shape: ShapeId },
    /// One distinct vertex of a shape
    Vertex { shape: ShapeId, index: usize },
    /// The label of a shape
    Label { shape: ShapeId },
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// The referenced shape, if any
    pub fn shape_id(&self) -> Option<ShapeId> {
        match self {
            Selection::Empty => None,
            Selection::Shape { shape }
            | Selection::Vertex { shape, .. }
            | Selection::Label { shape } => Some(*shape),
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::Empty;
    }
}

/// Score of a feature at `distance` with the given activation radius
pub fn activation_score(distance: f64, activation_radius: f64) -> f64 {
    (activation_radius - distance).max(0.0)
}

/// Single-pass best-feature search around a cursor position
///
/// Only a strictly better score replaces the current best, so among equal
/// scores the first tested feature wins; callers control priority among ties
/// by test order.
#[derive(Debug, Clone)]
pub struct SelectionResolver {
    cursor: ImagePoint,
    config: SelectionConfig,
    best_selection: Selection,
    best_score: f64,
}

impl SelectionResolver {
    /// Start a search with the default activation radii
    pub fn new(cursor: ImagePoint) -> Self {
        Self::with_config(cursor, SelectionConfig::default())
    }

    /// Start a search with custom activation radii
    pub fn with_config(cursor: ImagePoint, config: SelectionConfig) -> Self {
        Self {
            cursor,
            config,
            best_selection: Selection::Empty,
            best_score: 0.0,
        }
    }

    /// Test a shape body as a filled polygon (closed ring expected)
    pub fn test_polygon(&mut self, polygon: &[ImagePoint], shape: ShapeId) {
        let distance = point_to_polygon_distance(self.cursor, polygon);
        self.offer(FeatureKind::Polygon, distance, Selection::Shape { shape });
    }

    /// Test a shape body as a line
    pub fn test_polyline(&mut self, polyline: &[ImagePoint], shape: ShapeId) {
        let distance = point_to_polyline_distance(self.cursor, polyline);
        self.offer(FeatureKind::Polyline, distance, Selection::Shape { shape });
    }

    /// Test a single vertex
    pub fn test_vertex(&mut self, vertex: ImagePoint, shape: ShapeId, index: usize) {
        let distance = self.cursor.distance_to(&vertex);
        self.offer(FeatureKind::Vertex, distance, Selection::Vertex { shape, index });
    }

    /// Test a label bounding box (as a filled rectangle)
    pub fn test_label(&mut self, bounds: &LabelRect, shape: ShapeId) {
        let distance = point_to_polygon_distance(self.cursor, &bounds.to_polygon());
        self.offer(FeatureKind::Label, distance, Selection::Label { shape });
    }

    /// Best feature found so far, or [`Selection::Empty`]
    pub fn best_selection(&self) -> Selection {
        self.best_selection
    }

    /// Score of the best feature (0 when nothing is reachable)
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    fn offer(&mut self, kind: FeatureKind, distance: f64, selection: Selection) {
        let score = activation_score(distance, self.config.radius_for(kind));
        if score > self.best_score {
            self.best_score = score;
            self.best_selection = selection;
        }
    }
}
