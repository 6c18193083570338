//! Static Chart Export Module
//! Renders the minute histogram to a PNG file with plotters.

use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const EXPORT_SIZE: (u32, u32) = (1200, 700);
const BAR_COLOR: RGBColor = RGBColor(52, 152, 219);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to render chart: {0}")]
    Render(String),
}

/// Write the minute histogram for `hour` to `path` as a PNG.
pub fn export_minute_histogram(
    path: &Path,
    hour: u8,
    bins: &[u32; 60],
) -> Result<(), ExportError> {
    let max = bins.iter().copied().max().unwrap_or(0).max(1);
    let y_top = max + max / 10 + 1;

    let root = BitMapBackend::new(path, EXPORT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let caption = format!(
        "Collisions by minute between {}:00 and {}:00",
        hour,
        (hour + 1) % 24
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0u32..60u32, 0u32..y_top)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Minute")
        .y_desc("Crashes")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bins.iter().enumerate().map(|(minute, &count)| {
            Rectangle::new(
                [(minute as u32, 0), (minute as u32 + 1, count)],
                BAR_COLOR.mix(0.8).filled(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}
