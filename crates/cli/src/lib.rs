use anyhow::{Context, Result};
use area_measure_core::{
    export_measurements_csv, load_document, save_document, CsvExportConfig, DragState,
    ImagePoint, Measurement, PendingShape, Scale, Selection, SelectionConfig, Shape,
    ShapeDocument, ShapeKind, Validity,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "area-measure")]
#[command(about = "Measure lengths and areas of shapes drawn on an image")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the measurement of every shape in a shape file.
    Measure {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        scale: ScaleArgs,
    },
    /// Report which feature a click at (X, Y) would select.
    Pick {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[command(flatten)]
        radii: RadiusArgs,
    },
    /// Build a shape from clicked points and print its measurement.
    Build {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(
            long = "point",
            value_name = "X,Y",
            value_parser = parse_point,
            allow_hyphen_values = true,
            required = true
        )]
        points: Vec<ImagePoint>,
        /// Also add the finished shape to this shape file.
        #[arg(long, value_name = "FILE")]
        append: Option<PathBuf>,
        #[command(flatten)]
        scale: ScaleArgs,
    },
    /// Drag the feature under --from to --to and save the file.
    Drag {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
        from: ImagePoint,
        #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
        to: ImagePoint,
        #[command(flatten)]
        radii: RadiusArgs,
    },
    /// Write a CSV report of all measurements.
    ExportCsv {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = ',')]
        delimiter: char,
        /// Leave self-intersecting shapes out of the report.
        #[arg(long)]
        exclude_invalid: bool,
        #[command(flatten)]
        scale: ScaleArgs,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum KindArg {
    Segment,
    #[value(aliases = ["polyline", "open-polyline"])]
    OpenPolyline,
    #[value(alias = "closed-polyline")]
    ClosedPolyline,
    Rectangle,
    Polygon,
}

impl From<KindArg> for ShapeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Segment => ShapeKind::Segment,
            KindArg::OpenPolyline => ShapeKind::OpenPolyline,
            KindArg::ClosedPolyline => ShapeKind::ClosedPolyline,
            KindArg::Rectangle => ShapeKind::Rectangle,
            KindArg::Polygon => ShapeKind::Polygon,
        }
    }
}

#[derive(Debug, Args)]
struct ScaleArgs {
    /// Real-world units per pixel (overrides the file's scale).
    #[arg(long)]
    units_per_pixel: Option<f64>,
    /// Unit name (overrides the file's unit).
    #[arg(long)]
    unit: Option<String>,
}

impl ScaleArgs {
    fn apply_to(&self, base: Scale) -> Result<Scale> {
        let mut scale = base;
        if let Some(units_per_pixel) = self.units_per_pixel {
            if !units_per_pixel.is_finite() || units_per_pixel <= 0.0 {
                anyhow::bail!("--units-per-pixel must be a positive number");
            }
            scale.units_per_pixel = units_per_pixel;
        }
        if let Some(unit) = &self.unit {
            scale.unit = unit.clone();
        }
        Ok(scale)
    }
}

#[derive(Debug, Args)]
struct RadiusArgs {
    #[arg(long)]
    vertex_radius: Option<f64>,
    #[arg(long)]
    polyline_radius: Option<f64>,
    #[arg(long)]
    polygon_radius: Option<f64>,
    #[arg(long)]
    label_radius: Option<f64>,
}

impl RadiusArgs {
    fn config(&self) -> SelectionConfig {
        let defaults = SelectionConfig::default();
        SelectionConfig {
            vertex_radius: self.vertex_radius.unwrap_or(defaults.vertex_radius),
            polyline_radius: self.polyline_radius.unwrap_or(defaults.polyline_radius),
            polygon_radius: self.polygon_radius.unwrap_or(defaults.polygon_radius),
            label_radius: self.label_radius.unwrap_or(defaults.label_radius),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShapeOutput {
    id: String,
    kind: ShapeKind,
    measurement: &'static str,
    raw: f64,
    value: f64,
    formatted: String,
    validity: Validity,
    vertices: Vec<ImagePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl ShapeOutput {
    fn new(shape: &Shape, scale: &Scale) -> Self {
        let measurement = shape.measurement();
        Self {
            id: shape.id().to_string(),
            kind: shape.kind(),
            measurement: measurement_name(measurement),
            raw: measurement.value(),
            value: scale.apply(measurement),
            formatted: scale.format(measurement),
            validity: shape.validity(),
            vertices: shape.vertices().to_vec(),
            label: shape.label().map(|label| label.text.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct PickOutput {
    selection: Option<Selection>,
}

#[derive(Debug, Serialize)]
struct BuildOutput {
    /// Whether the builder completed the shape on its own (segment, rectangle)
    complete: bool,
    #[serde(flatten)]
    shape: ShapeOutput,
}

#[derive(Debug, Serialize)]
struct DragOutput {
    selection: Selection,
    shape: ShapeOutput,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Measure { file, scale } => run_measure(&file, &scale),
        Commands::Pick { file, x, y, radii } => run_pick(&file, ImagePoint::new(x, y), &radii),
        Commands::Build { kind, points, append, scale } => {
            run_build(kind.into(), &points, append.as_deref(), &scale)
        }
        Commands::Drag { file, from, to, radii } => run_drag(&file, from, to, &radii),
        Commands::ExportCsv { file, output, delimiter, exclude_invalid, scale } => {
            run_export_csv(&file, output.as_deref(), delimiter, exclude_invalid, &scale)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_measure(file: &Path, scale_args: &ScaleArgs) -> Result<()> {
    let (document, scale) = open_shapes(file)?;
    let scale = scale_args.apply_to(scale)?;

    let payload: Vec<ShapeOutput> =
        document.shapes().map(|shape| ShapeOutput::new(shape, &scale)).collect();
    print_json(&payload)
}

fn run_pick(file: &Path, cursor: ImagePoint, radii: &RadiusArgs) -> Result<()> {
    let (document, _) = open_shapes(file)?;
    let selection = document.resolve_selection(cursor, &radii.config());

    let payload = PickOutput { selection: (!selection.is_empty()).then_some(selection) };
    print_json(&payload)
}

fn run_build(
    kind: ShapeKind,
    points: &[ImagePoint],
    append: Option<&Path>,
    scale_args: &ScaleArgs,
) -> Result<()> {
    let mut pending = PendingShape::new(kind);
    let mut complete = false;
    for (index, point) in points.iter().enumerate() {
        if pending.push(*point) {
            complete = true;
            if index + 1 < points.len() {
                log::warn!(
                    "{} complete after {} points; ignoring {} more",
                    kind.name(),
                    index + 1,
                    points.len() - index - 1
                );
            }
            break;
        }
    }
    let shape = pending.finish();

    // Resolve the scale before touching the shape file
    let existing = match append {
        Some(path) if path.exists() => Some(open_shapes(path)?),
        _ => None,
    };
    let base_scale = existing.as_ref().map(|(_, scale)| scale.clone()).unwrap_or_default();
    let scale = scale_args.apply_to(base_scale)?;

    if let Some(path) = append {
        // A new file keeps the scale given on this command
        let (mut document, file_scale) =
            existing.unwrap_or_else(|| (ShapeDocument::new(), scale.clone()));
        document.insert(shape.clone());
        save_document(path, &document, &file_scale)
            .with_context(|| format!("failed to save shapes to {}", path.display()))?;
    }

    print_json(&BuildOutput { complete, shape: ShapeOutput::new(&shape, &scale) })
}

fn run_drag(file: &Path, from: ImagePoint, to: ImagePoint, radii: &RadiusArgs) -> Result<()> {
    let (mut document, scale) = open_shapes(file)?;

    let selection = document.resolve_selection(from, &radii.config());
    if selection.is_empty() {
        anyhow::bail!("nothing to drag at ({}, {})", from.x, from.y);
    }

    let mut drag = DragState::begin(&document, selection, from)?;
    drag.update(&mut document, to)?;
    save_document(file, &document, &scale)
        .with_context(|| format!("failed to save shapes to {}", file.display()))?;

    let shape = selection
        .shape_id()
        .and_then(|id| document.get(id))
        .context("dragged shape disappeared")?;
    print_json(&DragOutput { selection, shape: ShapeOutput::new(shape, &scale) })
}

fn run_export_csv(
    file: &Path,
    output: Option<&Path>,
    delimiter: char,
    exclude_invalid: bool,
    scale_args: &ScaleArgs,
) -> Result<()> {
    let (document, scale) = open_shapes(file)?;
    let scale = scale_args.apply_to(scale)?;

    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .context("--delimiter must be a single ASCII character")?;
    let config = CsvExportConfig { delimiter, include_invalid: !exclude_invalid, ..Default::default() };

    match output {
        Some(path) => {
            let writer = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export_measurements_csv(writer, &document, &scale, &config)?;
            println!("{}", path.display());
        }
        None => {
            let stdout = io::stdout();
            export_measurements_csv(stdout.lock(), &document, &scale, &config)?;
        }
    }

    Ok(())
}

fn open_shapes(file: &Path) -> Result<(ShapeDocument, Scale)> {
    ensure_file_exists(file)?;
    load_document(file).with_context(|| format!("failed to load shapes from {}", file.display()))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

fn measurement_name(measurement: Measurement) -> &'static str {
    match measurement {
        Measurement::Length(_) => "length",
        Measurement::Area(_) => "area",
    }
}

fn parse_point(value: &str) -> Result<ImagePoint, String> {
    let (x, y) = value.split_once(',').ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x coordinate '{}'", x.trim()))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y coordinate '{}'", y.trim()))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("coordinates must be finite: '{value}'"));
    }
    Ok(ImagePoint::new(x, y))
}
