// File: crates/chart-render-skia/src/lib.rs
// Summary: Skia renderer crate: CPU raster surfaces, text shaping and the render entry points.

pub mod canvas;
pub mod text;

use anyhow::{Context, Result};
use tracing::debug;

use chart_core::{Chart, ChartRequest, Dimensions};

pub use canvas::SkiaCanvas;
pub use text::TextShaper;

/// Rendered chart as unpremultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// RGBA of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.stride() + x as usize * 4;
        self.pixels.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

fn draw(request: &ChartRequest) -> Result<SkiaCanvas> {
    let chart = Chart::prepare(request).context("invalid chart request")?;
    let dims = chart.dimensions();
    let mut canvas = SkiaCanvas::new(dims.width, dims.height)?;
    chart.render(&mut canvas).context("chart render failed")?;
    debug!(width = dims.width, height = dims.height, "rendered chart on raster surface");
    Ok(canvas)
}

/// Render `request` into an RGBA8 buffer.
pub fn render_rgba8(request: &ChartRequest) -> Result<RasterImage> {
    let mut canvas = draw(request)?;
    let (width, height) = chart_core::Canvas::size(&canvas);
    let pixels = canvas.to_rgba8()?;
    Ok(RasterImage { width, height, pixels })
}

/// Render `request` and encode it as PNG bytes.
pub fn render_png(request: &ChartRequest) -> Result<Vec<u8>> {
    draw(request)?.to_png()
}

/// Final image size for `request`; no surface is allocated.
pub fn render_dimensions(request: &ChartRequest) -> Result<Dimensions> {
    chart_core::dimensions(request).context("invalid chart request")
}
