// File: crates/demo/src/main.rs
// Summary: Demo CLI: loads a JSON chart description (plus CSV samples), renders with Skia and writes a PNG.

mod samples;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chart_core::{Aggregation, ChartKind, ChartRequest, DrawType, SeriesSpec, Side, TriggerMark};
use chart_render_skia::{render_dimensions, render_rgba8};

#[derive(Parser)]
#[command(
    name = "chart-demo",
    version,
    about = "Render a monitoring chart to PNG",
    after_help = "Examples:
  chart-demo                                   Built-in sample chart
  chart-demo --config cpu.json --out cpu.png   Chart from a JSON description
  chart-demo --config cpu.json --dimensions-only"
)]
struct Args {
    /// JSON chart description; a built-in sample is used when omitted
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "target/out/chart.png", value_name = "PATH")]
    out: PathBuf,

    /// Print the final image size without rendering
    #[arg(long)]
    dimensions_only: bool,

    /// Theme preset (original-blue, dark, light, high-contrast-dark)
    #[arg(long)]
    theme: Option<String>,

    /// IANA time zone for the time axis
    #[arg(long, value_name = "ZONE")]
    timezone: Option<String>,
}

/// Chart description plus CSV files feeding its series.
#[derive(Deserialize)]
struct DemoConfig {
    #[serde(flatten)]
    chart: ChartRequest,
    #[serde(default)]
    samples: Vec<SampleFile>,
}

/// CSV samples for the series at `series` (index into the chart's series list).
#[derive(Deserialize)]
struct SampleFile {
    series: usize,
    path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut request = match &args.config {
        Some(path) => load_config(path)?,
        None => sample_request(),
    };
    if let Some(theme) = args.theme {
        request.theme = theme;
    }
    if let Some(tz) = args.timezone {
        request.timezone = tz;
    }

    if args.dimensions_only {
        let dims = render_dimensions(&request)?;
        println!("{}x{}", dims.width, dims.height);
        return Ok(());
    }

    let image = render_rgba8(&request)?;
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.pixels)
        .context("pixel buffer does not match image size")?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    buffer.save(&args.out).with_context(|| format!("writing {}", args.out.display()))?;
    info!(path = %args.out.display(), width = image.width, height = image.height, "wrote chart");
    Ok(())
}

fn load_config(path: &Path) -> Result<ChartRequest> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let DemoConfig { mut chart, samples: files } =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let plot_width = render_dimensions(&chart)?.plot_width;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for file in files {
        let csv_path = if file.path.is_absolute() { file.path.clone() } else { base.join(&file.path) };
        let loaded = samples::load_csv(&csv_path)?;
        let spec = chart
            .series
            .get_mut(file.series)
            .with_context(|| format!("{}: no series #{}", csv_path.display(), file.series))?;
        spec.buckets = samples::aggregate(&loaded, chart.from, chart.period, plot_width);
        info!(file = %csv_path.display(), samples = loaded.len(), columns = spec.buckets.len(), "loaded samples");
    }
    Ok(chart)
}

/// Two synthetic series over one day with an outage, a trigger and percentiles.
fn sample_request() -> ChartRequest {
    let from = 1_700_000_000 - 1_700_000_000 % 3600;
    let period = 86_400;
    let mut request = ChartRequest::new(ChartKind::Normal, 900, 300, from, period);
    request.title = "CPU load".to_string();
    request.now = Some(from + period);
    request.percentile.left = 95.0;
    request.triggers.push(TriggerMark {
        side: Side::Left,
        value: 1.5,
        color: chart_core::Color::rgb(0xDC, 0x14, 0x3C),
        description: "High load".to_string(),
        constant: "[> 1.5]".to_string(),
    });

    let series: [(&str, f64, DrawType, Aggregation); 2] =
        [("Load 1m", 1.0, DrawType::Line, Aggregation::All), ("Load 15m", 0.6, DrawType::GradientLine, Aggregation::Avg)];
    request.series = series
        .iter()
        .enumerate()
        .map(|(k, &(name, _, draw_type, aggregation))| {
            let mut spec = SeriesSpec::new(k as u64 + 1, name).with_draw_type(draw_type).with_aggregation(aggregation);
            spec.host = "web-01".to_string();
            spec
        })
        .collect();

    // columns depend on the final layout
    let plot_width = chart_core::dimensions(&request).map(|d| d.plot_width).unwrap_or(request.width);
    for (spec, &(_, scale, _, _)) in request.series.iter_mut().zip(series.iter()) {
        let raw: Vec<samples::Sample> = (0..period / 60)
            .map(|i| i * 60)
            // one hour without data
            .filter(|&t| !(36_000..39_600).contains(&t))
            .map(|t| {
                let phase = t as f64 / period as f64 * std::f64::consts::TAU;
                samples::Sample { clock: from + t, value: scale * (1.0 + phase.sin() * 0.8 + (t % 700) as f64 / 2000.0) }
            })
            .collect();
        spec.buckets = samples::aggregate(&raw, from, period, plot_width);
    }
    request
}
