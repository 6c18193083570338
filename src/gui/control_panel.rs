//! Control Panel Widget
//! Left side panel holding the five dashboard controls plus data-source
//! selection, export, and the status line.

use crate::config::DEFAULT_ROW_LIMIT;
use crate::data::AffectedType;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Current values of the dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSettings {
    /// Injury threshold for the point map, [0, 19].
    pub min_injured: i64,
    /// Hour of day for the density and histogram views, [0, 23].
    pub hour: u8,
    /// Person category for the street ranking.
    pub affected: AffectedType,
    /// Year for the fatality view, clamped to the derived range.
    pub year: i32,
    /// Whether the raw hour-slice table is shown.
    pub show_raw: bool,
    /// Row cap passed to the loader.
    pub row_limit: usize,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            min_injured: 0,
            hour: 0,
            affected: AffectedType::Pedestrians,
            year: 0,
            show_raw: false,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: ControlSettings,
    pub data_path: Option<PathBuf>,
    pub year_bounds: Option<(i32, i32)>,
    pub status: String,
    pub loaded: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: ControlSettings::default(),
            data_path: None,
            year_bounds: None,
            status: "Select a collision CSV to begin".to_string(),
            loaded: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the year range derived from the loaded table and clamp the year
    /// control into it.
    pub fn update_year_bounds(&mut self, bounds: Option<(i32, i32)>) {
        self.year_bounds = bounds;
        if let Some((lo, hi)) = bounds {
            self.settings.year = self.settings.year.clamp(lo, hi);
        }
    }

    /// Set the status line.
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel.
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚦 Crashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("NYC Motor Vehicle Collisions")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.data_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseData;
                        }
                    });
                });

                ui.horizontal(|ui| {
                    ui.label("Row limit:");
                    ui.add(
                        egui::DragValue::new(&mut self.settings.row_limit)
                            .range(1..=10_000_000)
                            .speed(1000),
                    );
                    if ui.small_button("Reload").clicked() {
                        action = ControlPanelAction::ReloadData;
                    }
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🎚 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.label("Persons injured in vehicle collisions:");
        ui.add(egui::Slider::new(&mut self.settings.min_injured, 0..=19));

        ui.add_space(8.0);
        ui.label("Hour to look at:");
        ui.add(egui::Slider::new(&mut self.settings.hour, 0..=23));

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Affected type:");
            ComboBox::from_id_salt("affected_type")
                .width(130.0)
                .selected_text(self.settings.affected.label())
                .show_ui(ui, |ui| {
                    for affected in AffectedType::ALL {
                        ui.selectable_value(
                            &mut self.settings.affected,
                            affected,
                            affected.label(),
                        );
                    }
                });
        });

        ui.add_space(8.0);
        match self.year_bounds {
            Some((lo, hi)) => {
                ui.label("Year to look at:");
                ui.add(egui::Slider::new(&mut self.settings.year, lo..=hi));
            }
            None => {
                ui.label(
                    RichText::new("Year range derives from the loaded data")
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }
        }

        ui.add_space(8.0);
        ui.checkbox(&mut self.settings.show_raw, "Show raw data");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.loaded, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Histogram").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportHistogram;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.loaded {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseData,
    ReloadData,
    ExportHistogram,
}
