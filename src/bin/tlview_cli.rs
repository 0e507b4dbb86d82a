//! CLI tool for tlview - lays out a matrix JSON file and writes the layout,
//! a PNG or an SVG
//!
//! Usage:
//!   tlview_cli <matrix.json>                        # Layout JSON to stdout
//!   tlview_cli <matrix.json> --format png           # Writes timeline.png
//!   tlview_cli <matrix.json> --format svg -o t.svg  # SVG to a chosen path

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use tlview::{layout, ExportFormat, ExportRenderer, FeatureColorMap, LayoutConfig, Matrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Png,
    Svg,
}

#[derive(Parser)]
#[command(name = "tlview_cli", version, about = "Lay out and export a step timeline")]
struct Cli {
    /// Matrix JSON: an array of rows, each `[label, step1, step2, ...]`
    matrix: PathBuf,

    /// Layout configuration JSON (camelCase fields, all optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feature colors JSON object, applied over the defaults
    #[arg(long)]
    colors: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Export width in logical pixels (overrides the configuration)
    #[arg(short, long)]
    width: Option<u32>,

    /// Output path. JSON defaults to stdout, images to timeline.png/.svg
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("tlview=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let matrix: Matrix = read_json(&cli.matrix)?;
    let mut config: LayoutConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => LayoutConfig::default(),
    };
    let mut colors = FeatureColorMap::default();
    if let Some(path) = &cli.colors {
        let overrides: std::collections::BTreeMap<String, String> = read_json(path)?;
        for (feature, hex) in &overrides {
            colors.set(feature, hex)?;
        }
    }

    config = config.with_suggested_export_width(tlview::layout::suggested_export_width(
        matrix.step_count(),
    ));
    if let Some(width) = cli.width {
        config = config.with_export_width(width)?;
    }

    let descriptor = layout(&matrix, &config, &colors);
    info!(
        rows = matrix.row_count(),
        steps = matrix.step_count(),
        width = config.export_width_px(),
        "Laid out matrix"
    );

    let (bytes, default_name) = match cli.format {
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&descriptor)?;
            json.push('\n');
            (json.into_bytes(), None)
        }
        Format::Png | Format::Svg => {
            let format = if cli.format == Format::Png {
                ExportFormat::Raster
            } else {
                ExportFormat::Vector
            };
            let artifact = ExportRenderer::new().export(format, &descriptor, config.export_width_px())?;
            (artifact.bytes, Some(artifact.filename))
        }
    };

    match cli.output.or_else(|| default_name.map(PathBuf::from)) {
        Some(path) => {
            fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
        }
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}
