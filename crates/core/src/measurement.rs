//! Shape measurement and scale conversion
//!
//! Measurements are always computed in raw pixel units from the current
//! geometry; nothing here is cached. A [`Scale`] turns them into real-world
//! units for display. How that scale was calibrated is not this crate's
//! concern.

use crate::builder::{closed_ring, ShapeKind};
use crate::geometry::{polygon_area, polyline_length, ImagePoint};
use serde::{Deserialize, Serialize};

/// Raw measurement of a shape in pixel units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Measurement {
    /// Length in pixels
    Length(f64),
    /// Area in square pixels
    Area(f64),
}

impl Measurement {
    /// The raw numeric value
    pub fn value(&self) -> f64 {
        match self {
            Measurement::Length(value) | Measurement::Area(value) => *value,
        }
    }

    pub fn is_area(&self) -> bool {
        matches!(self, Measurement::Area(_))
    }
}

/// Measure a polyline according to its kind
///
/// Length kinds sum their edges as stored (a finished closed polyline includes
/// its closing edge). Area kinds are measured on the closed ring.
pub fn measure(polyline: &[ImagePoint], kind: ShapeKind) -> Measurement {
    match kind {
        ShapeKind::Segment | ShapeKind::OpenPolyline | ShapeKind::ClosedPolyline => {
            Measurement::Length(polyline_length(polyline))
        }
        ShapeKind::Rectangle | ShapeKind::Polygon => {
            Measurement::Area(polygon_area(&closed_ring(polyline)))
        }
    }
}

/// Conversion from pixels to real-world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Real-world units per pixel
    pub units_per_pixel: f64,
    /// Unit of measurement (e.g., "m", "ft", "mm")
    pub unit: String,
}

impl Scale {
    /// Create a new scale
    pub fn new(units_per_pixel: f64, unit: impl Into<String>) -> Self {
        Self {
            units_per_pixel,
            unit: unit.into(),
        }
    }

    /// Identity scale reporting raw pixels
    pub fn pixels() -> Self {
        Self::new(1.0, "px")
    }

    /// Convert a pixel length to real-world units
    pub fn to_real_length(&self, pixels: f64) -> f64 {
        pixels * self.units_per_pixel
    }

    /// Convert a square-pixel area to square real-world units
    pub fn to_real_area(&self, square_pixels: f64) -> f64 {
        square_pixels * self.units_per_pixel * self.units_per_pixel
    }

    /// Convert a raw measurement to real-world units
    pub fn apply(&self, measurement: Measurement) -> f64 {
        match measurement {
            Measurement::Length(pixels) => self.to_real_length(pixels),
            Measurement::Area(square_pixels) => self.to_real_area(square_pixels),
        }
    }

    /// Unit suffix for a measurement ("m" or "m²")
    pub fn unit_for(&self, measurement: Measurement) -> String {
        match measurement {
            Measurement::Length(_) => self.unit.clone(),
            Measurement::Area(_) => format!("{}²", self.unit),
        }
    }

    /// Display label with value and unit
    pub fn format(&self, measurement: Measurement) -> String {
        format!(
            "{:.2} {}",
            self.apply(measurement),
            self.unit_for(measurement)
        )
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::pixels()
    }
}
