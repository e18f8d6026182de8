//! Area Measure Core Library
//!
//! Geometry, shape construction, measurement and selection for shapes drawn
//! over a raster image.

pub mod builder;
pub mod csv_export;
pub mod document;
pub mod geometry;
pub mod manipulation;
pub mod measurement;
pub mod persistence;
pub mod selection;
pub mod shape;

pub use builder::{add_point, finish, validity, PendingShape, ShapeKind, Validity};
pub use csv_export::{export_measurements_csv, CsvExportConfig, CsvExportError, CsvExportResult};
pub use document::{DocumentError, DocumentResult, ShapeDocument};
pub use geometry::{ImagePoint, LabelRect};
pub use manipulation::DragState;
pub use measurement::{measure, Measurement, Scale};
pub use persistence::{
    load_document, save_document, sidecar_path, PersistenceError, PersistenceResult,
};
pub use selection::{
    activation_score, FeatureKind, Selection, SelectionConfig, SelectionResolver,
};
pub use shape::{Label, Shape, ShapeId};
