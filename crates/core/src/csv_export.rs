//! CSV export for shape measurements
//!
//! Produces one row per shape so that measurements can be pulled into a
//! spreadsheet or another reporting tool.

use crate::builder::Validity;
use crate::document::ShapeDocument;
use crate::measurement::Scale;
use std::io::Write;

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Include self-intersecting shapes
    pub include_invalid: bool,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
            include_invalid: true,
        }
    }
}

/// Export shape measurements to CSV format
///
/// CSV columns:
/// - ID: Shape identifier
/// - Kind: Shape kind (Segment, Polygon, ...)
/// - Vertices: Number of distinct vertices
/// - Raw Value: Measurement in pixels or square pixels
/// - Value: Measurement converted with `scale`
/// - Unit: Unit of the converted value (e.g., "m" or "m²")
/// - Label: Label text (if any)
/// - Validity: "valid" or "self-intersecting"
///
/// # Errors
/// Returns `CsvExportError` if writing a record or flushing `writer` fails
pub fn export_measurements_csv<W: Write>(
    writer: W,
    document: &ShapeDocument,
    scale: &Scale,
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer);

    // Write headers
    if config.include_headers {
        csv_writer.write_record([
            "ID",
            "Kind",
            "Vertices",
            "Raw Value",
            "Value",
            "Unit",
            "Label",
            "Validity",
        ])?;
    }

    // Write shape rows
    let mut rows = 0usize;
    for shape in document.shapes() {
        let validity = shape.validity();
        if !config.include_invalid && !validity.is_valid() {
            continue;
        }

        let measurement = shape.measurement();
        csv_writer.write_record(&[
            shape.id().to_string(),
            shape.kind().name().to_string(),
            shape.vertices().len().to_string(),
            format!("{:.4}", measurement.value()),
            format!("{:.4}", scale.apply(measurement)),
            scale.unit_for(measurement),
            shape
                .label()
                .map(|label| label.text.clone())
                .unwrap_or_default(),
            validity_name(validity).to_string(),
        ])?;
        rows += 1;
    }

    csv_writer.flush()?;
    log::debug!("exported {} of {} shapes to CSV", rows, document.len());
    Ok(())
}

fn validity_name(validity: Validity) -> &'static str {
    match validity {
        Validity::Valid => "valid",
        Validity::SelfIntersecting => "self-intersecting",
    }
}
