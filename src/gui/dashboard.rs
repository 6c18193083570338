//! Dashboard Widget
//! Scrollable central panel with one section per visualization. Holds only
//! render-ready view outputs; the app recomputes them when a control changes.

use crate::charts::{ChartPlotter, HexBin};
use crate::data::StreetRanking;
use crate::gui::control_panel::ControlSettings;
use egui::{RichText, ScrollArea};
use polars::prelude::DataFrame;

/// Render-ready state for every dashboard section.
pub struct Dashboard {
    /// Injury-threshold map points.
    pub points: Vec<(f64, f64)>,
    /// Hexagonal density bins for the selected hour.
    pub density_bins: Vec<HexBin>,
    /// Density view center; None when no center can be derived at all.
    pub density_center: Option<(f64, f64)>,
    /// Minute-of-hour histogram bins.
    pub histogram: [u32; 60],
    /// Ranked streets for the selected affected type.
    pub streets: Vec<StreetRanking>,
    /// Hour slice backing the density caption and the raw-data table.
    pub hour_table: Option<DataFrame>,
    /// Fatality rows for the selected year.
    pub fatalities: Option<DataFrame>,
    pub fatality_total: i64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            density_bins: Vec::new(),
            density_center: None,
            histogram: [0; 60],
            streets: Vec::new(),
            hour_table: None,
            fatalities: None,
            fatality_total: 0,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all view outputs (used when a new data file is chosen).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn section_header(ui: &mut egui::Ui, title: &str) {
        ui.add_space(12.0);
        ui.label(RichText::new(title).size(17.0).strong());
        ui.add_space(6.0);
    }

    /// Draw the dashboard. `loaded` is false until a table is available.
    pub fn show(&self, ui: &mut egui::Ui, settings: &ControlSettings, loaded: bool) {
        if !loaded {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        let hour = settings.hour;
        let next_hour = (hour + 1) % 24;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::section_header(ui, "Where are the most persons injured?");
                ui.label(format!(
                    "Collisions with at least {} persons injured",
                    settings.min_injured
                ));
                if self.points.is_empty() {
                    ui.label(RichText::new("No collisions at this threshold").italics());
                } else {
                    ChartPlotter::draw_point_map(ui, &self.points);
                }

                ui.add_space(8.0);
                ui.separator();

                Self::section_header(ui, "How many collisions occur during a given hour?");
                ui.label(format!(
                    "Collisions between {}:00 and {}:00 ({} records)",
                    hour,
                    next_hour,
                    self.hour_table.as_ref().map_or(0, |t| t.height())
                ));
                match self.density_center {
                    Some(center) => ChartPlotter::draw_hex_density(ui, &self.density_bins, center),
                    None => {
                        ui.label(RichText::new("No location data to center on").italics());
                    }
                }

                ui.add_space(8.0);
                ui.separator();

                Self::section_header(
                    ui,
                    &format!("Breakdown by minute between {}:00 and {}:00", hour, next_hour),
                );
                ChartPlotter::draw_minute_histogram(ui, &self.histogram);

                ui.add_space(8.0);
                ui.separator();

                Self::section_header(ui, "Top 5 dangerous streets by affected type");
                ui.label(format!("Affected type: {}", settings.affected.label()));
                ChartPlotter::draw_street_table(ui, &self.streets);

                ui.add_space(8.0);
                ui.separator();

                Self::section_header(ui, "Persons killed in the year");
                ui.label(format!(
                    "{} persons killed in {}",
                    self.fatality_total, settings.year
                ));
                if let Some(fatalities) = &self.fatalities {
                    if fatalities.height() > 0 {
                        ChartPlotter::draw_frame_table(ui, "fatality_table", fatalities);
                    } else {
                        ui.label(
                            RichText::new("No recorded fatality counts in this year").italics(),
                        );
                    }
                }

                if settings.show_raw {
                    ui.add_space(8.0);
                    ui.separator();
                    Self::section_header(ui, "Raw Data");
                    if let Some(hour_table) = &self.hour_table {
                        ScrollArea::horizontal().show(ui, |ui| {
                            ChartPlotter::draw_frame_table(ui, "raw_table", hour_table);
                        });
                    }
                }

                ui.add_space(20.0);
            });
    }
}
