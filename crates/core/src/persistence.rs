//! Shape persistence
//!
//! Shapes and the active scale are saved as a JSON sidecar file next to the
//! image they were drawn on.

use crate::document::ShapeDocument;
use crate::measurement::Scale;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Current sidecar format version
pub const FORMAT_VERSION: u32 = 1;

/// Error types for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported shape file version {found} (expected {FORMAT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Serialize)]
struct ShapeFileRef<'a> {
    version: u32,
    scale: &'a Scale,
    shapes: Vec<&'a Shape>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct ShapeFile {
    #[serde(default)]
    scale: Scale,
    shapes: Vec<Shape>,
}

/// Get the sidecar file path for a given image path
///
/// # Example
/// ```
/// use std::path::Path;
/// use area_measure_core::persistence::sidecar_path;
///
/// let path = sidecar_path(Path::new("/plans/floor.png"));
/// assert_eq!(path, Path::new("/plans/floor.png.measure.json"));
/// ```
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut path = image_path.as_os_str().to_owned();
    path.push(".measure.json");
    PathBuf::from(path)
}

/// Save all shapes and the scale to `path`
///
/// # Arguments
/// * `path` - Destination file, usually from [`sidecar_path`]
/// * `document` - Shapes to save, written in z-order
/// * `scale` - Calibration stored alongside the shapes
///
/// # Errors
/// Returns `PersistenceError` if serialization or the file write fails
pub fn save_document(path: &Path, document: &ShapeDocument, scale: &Scale) -> PersistenceResult<()> {
    // Serialize to JSON with pretty printing
    let file = ShapeFileRef {
        version: FORMAT_VERSION,
        scale,
        shapes: document.shapes().collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    // Write to file atomically using a temporary file
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;

    log::info!("saved {} shapes to {}", document.len(), path.display());
    Ok(())
}

/// Parse a shape file from its JSON text
pub fn parse_document(json: &str) -> PersistenceResult<(ShapeDocument, Scale)> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    if probe.version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: probe.version,
        });
    }

    let file: ShapeFile = serde_json::from_str(json)?;
    let mut document = ShapeDocument::new();
    for shape in file.shapes {
        document.insert(shape);
    }
    Ok((document, file.scale))
}

/// Load shapes and scale from `path`
///
/// # Returns
/// The document with shapes in their saved z-order and ids, and the saved
/// scale (pixels when the file has none)
///
/// # Errors
/// Returns `PersistenceError` if the file cannot be read, is not a shape
/// file, or has an unsupported version
pub fn load_document(path: &Path) -> PersistenceResult<(ShapeDocument, Scale)> {
    let json = fs::read_to_string(path)?;
    let (document, scale) = parse_document(&json)?;
    log::info!("loaded {} shapes from {}", document.len(), path.display());
    Ok((document, scale))
}
