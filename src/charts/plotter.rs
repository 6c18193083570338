//! Chart Plotter Module
//! Draws the interactive dashboard visualizations using egui_plot.

use crate::charts::hexbin::HexBin;
use crate::data::StreetRanking;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot, PlotBounds, PlotPoints, Points, Polygon};
use polars::prelude::*;

/// Marker color for the injury-threshold point map.
pub const POINT_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

/// Density ramp endpoints, low to high occupancy.
const DENSITY_LOW: Color32 = Color32::from_rgb(254, 217, 118);
const DENSITY_HIGH: Color32 = Color32::from_rgb(177, 0, 38);

/// Histogram bar color.
const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

/// Cap for rows shown in the raw-data and fatality tables.
const TABLE_MAX_ROWS: usize = 100;

/// Half-width of the density view around its center, in degrees.
const DENSITY_VIEW_SPAN: f64 = 0.04;

/// Draws the dashboard charts and tables.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Scatter map of (latitude, longitude) points.
    pub fn draw_point_map(ui: &mut egui::Ui, points: &[(f64, f64)]) {
        let mean_lat = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.0).sum::<f64>() / points.len() as f64
        };
        let aspect = 1.0 / mean_lat.to_radians().cos().abs().max(0.01);

        let plot_points: PlotPoints = points.iter().map(|&(lat, lon)| [lon, lat]).collect();

        Plot::new("injury_point_map")
            .height(340.0)
            .data_aspect(aspect as f32)
            .allow_scroll(false)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(plot_points)
                        .radius(1.5)
                        .color(POINT_COLOR)
                        .name("collisions"),
                );
            });
    }

    /// Hexagonal density layer. Bin occupancy maps to a color ramp; the view
    /// opens centered on `center` (the callers guarantee it is well-defined).
    pub fn draw_hex_density(ui: &mut egui::Ui, bins: &[HexBin], center: (f64, f64)) {
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1);
        let aspect = 1.0 / center.0.to_radians().cos().abs().max(0.01);
        let bins: Vec<HexBin> = bins.to_vec();

        Plot::new("hour_density_map")
            .height(340.0)
            .data_aspect(aspect as f32)
            .allow_scroll(false)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(ui, |plot_ui| {
                for bin in &bins {
                    let ring: PlotPoints =
                        bin.corners.iter().map(|&(lat, lon)| [lon, lat]).collect();
                    let t = bin.count as f32 / max_count as f32;
                    plot_ui.polygon(
                        Polygon::new(ring)
                            .fill_color(Self::density_color(t))
                            .stroke(egui::Stroke::new(0.5, Color32::from_gray(60))),
                    );
                }
                if bins.is_empty() {
                    let (lat, lon) = center;
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                        [lon - DENSITY_VIEW_SPAN, lat - DENSITY_VIEW_SPAN],
                        [lon + DENSITY_VIEW_SPAN, lat + DENSITY_VIEW_SPAN],
                    ));
                }
            });
    }

    /// Interpolate the density ramp at `t` in [0, 1].
    fn density_color(t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(
            lerp(DENSITY_LOW.r(), DENSITY_HIGH.r()),
            lerp(DENSITY_LOW.g(), DENSITY_HIGH.g()),
            lerp(DENSITY_LOW.b(), DENSITY_HIGH.b()),
        )
    }

    /// 60-bin bar chart of collisions per minute of the selected hour.
    pub fn draw_minute_histogram(ui: &mut egui::Ui, bins: &[u32; 60]) {
        let bars: Vec<Bar> = bins
            .iter()
            .enumerate()
            .map(|(minute, &count)| Bar::new(minute as f64, count as f64).width(0.9))
            .collect();

        Plot::new("minute_histogram")
            .height(280.0)
            .allow_scroll(false)
            .x_axis_label("Minute")
            .y_axis_label("Crashes")
            .include_y(1.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("crashes"));
            });
    }

    /// Ranked table of dangerous streets.
    pub fn draw_street_table(ui: &mut egui::Ui, rankings: &[StreetRanking]) {
        if rankings.is_empty() {
            ui.label(RichText::new("No qualifying streets").italics());
            return;
        }

        egui::Grid::new("street_table")
            .striped(true)
            .min_col_width(120.0)
            .show(ui, |ui| {
                ui.label(RichText::new("Street").strong());
                ui.label(RichText::new("Injured").strong());
                ui.end_row();
                for ranking in rankings {
                    ui.label(&ranking.street);
                    ui.label(ranking.injured.to_string());
                    ui.end_row();
                }
            });
    }

    /// Generic table of the first rows of a frame, one column per frame column.
    pub fn draw_frame_table(ui: &mut egui::Ui, id: &str, frame: &DataFrame) {
        if frame.height() == 0 {
            ui.label(RichText::new("No rows").italics());
            return;
        }

        let shown = frame.height().min(TABLE_MAX_ROWS);
        egui::Grid::new(id).striped(true).show(ui, |ui| {
            for name in frame.get_column_names() {
                ui.label(RichText::new(name.to_string()).strong());
            }
            ui.end_row();

            for row in 0..shown {
                for column in frame.get_columns() {
                    let text = match column.get(row) {
                        Ok(value) if matches!(value, AnyValue::Null) => String::new(),
                        Ok(value) => value.to_string().trim_matches('"').to_string(),
                        Err(_) => String::new(),
                    };
                    ui.label(text);
                }
                ui.end_row();
            }
        });

        if frame.height() > shown {
            ui.label(
                RichText::new(format!("Showing {} of {} rows", shown, frame.height())).weak(),
            );
        }
    }
}
