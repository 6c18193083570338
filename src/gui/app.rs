//! Crashboard Main Application
//! Main window wiring the controls to the view functions and renderers.
//! Each control change recomputes only the views that read that control.

use crate::charts::{bin_points, export_minute_histogram, DEFAULT_RADIUS_DEG};
use crate::config::{AppConfig, ConfigManager};
use crate::data::{self, CollisionStore};
use crate::gui::control_panel::{ControlPanel, ControlPanelAction, ControlSettings};
use crate::gui::dashboard::Dashboard;
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application window.
pub struct CrashboardApp {
    store: Option<CollisionStore>,
    table: Option<Arc<DataFrame>>,
    control_panel: ControlPanel,
    dashboard: Dashboard,
    /// Settings the dashboard currently reflects; diffed against the panel
    /// each frame to recompute only the affected views.
    applied: Option<ControlSettings>,
    config_manager: Option<ConfigManager>,
    config: AppConfig,
}

impl CrashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: Option<PathBuf>) -> Self {
        let config_manager = match ConfigManager::new("crashboard") {
            Ok(manager) => Some(manager),
            Err(err) => {
                warn!(%err, "config directory unavailable; settings will not persist");
                None
            }
        };
        let config = config_manager
            .as_ref()
            .map(|manager| manager.load())
            .unwrap_or_default();

        let mut app = Self {
            store: None,
            table: None,
            control_panel: ControlPanel::new(),
            dashboard: Dashboard::new(),
            applied: None,
            config_manager,
            config,
        };
        app.control_panel.settings.row_limit = app.config.row_limit;

        if let Some(path) = data_path.or_else(|| app.config.data_path.clone()) {
            app.set_data_path(path);
        }
        app
    }

    /// Point the app at a collision CSV. A new path means a new store; the
    /// previous cache is dropped with it.
    fn set_data_path(&mut self, path: PathBuf) {
        self.control_panel.data_path = Some(path.clone());
        self.store = Some(CollisionStore::new(path));
        self.table = None;
        self.applied = None;
        self.control_panel.loaded = false;
        self.dashboard.clear();
        self.load_table();
    }

    /// Load (or re-serve from cache) the table for the current row limit.
    fn load_table(&mut self) {
        let row_limit = self.control_panel.settings.row_limit;
        let Some(store) = self.store.as_mut() else {
            self.control_panel.set_status("No data file selected");
            return;
        };

        match store.load(row_limit) {
            Ok(table) => {
                self.control_panel
                    .set_status(&format!("Loaded {} geolocated collisions", table.height()));
                self.control_panel.loaded = true;
                self.table = Some(table);
                self.persist_config();
                self.refresh_all();
            }
            Err(err) => {
                error!(%err, "collision data load failed");
                self.control_panel.set_status(&format!("Error: {}", err));
                // A previously loaded table (and its views) stays usable.
                if self.table.is_none() {
                    self.control_panel.loaded = false;
                }
            }
        }
    }

    fn persist_config(&mut self) {
        self.config.data_path = self.store.as_ref().map(|s| s.path().to_path_buf());
        self.config.row_limit = self.control_panel.settings.row_limit;
        if let Some(manager) = &self.config_manager {
            if let Err(err) = manager.save(&self.config) {
                warn!(%err, "could not persist config");
            }
        }
    }

    fn report_view_error(&mut self, view: &str, err: &data::ViewError) {
        warn!(view, %err, "view recomputation failed");
        self.control_panel
            .set_status(&format!("Error in {} view: {}", view, err));
    }

    fn refresh_all(&mut self) {
        self.refresh_year_bounds();
        self.refresh_threshold_view();
        self.refresh_hour_views();
        self.refresh_street_view();
        self.refresh_fatality_view();
        self.applied = Some(self.control_panel.settings.clone());
    }

    fn refresh_threshold_view(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        match data::points_above_threshold(&table, self.control_panel.settings.min_injured) {
            Ok(points) => self.dashboard.points = points,
            Err(err) => self.report_view_error("injury map", &err),
        }
    }

    fn refresh_hour_views(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let hour = self.control_panel.settings.hour;

        match data::hour_slice(&table, hour) {
            Ok(slice) => {
                // Mean of an empty slice is undefined; fall back to the
                // full-table center rather than handing NaN to the plot.
                let center = match data::mean_center(&slice) {
                    Ok(Some(center)) => Some(center),
                    Ok(None) => data::mean_center(&table).ok().flatten(),
                    Err(err) => {
                        self.report_view_error("density", &err);
                        None
                    }
                };
                self.dashboard.density_center = center;
                match data::coordinates(&slice) {
                    Ok(coords) => {
                        self.dashboard.density_bins = bin_points(&coords, DEFAULT_RADIUS_DEG);
                    }
                    Err(err) => self.report_view_error("density", &err),
                }
                self.dashboard.hour_table = Some(slice);
            }
            Err(err) => self.report_view_error("hour slice", &err),
        }

        match data::minute_histogram(&table, hour) {
            Ok(histogram) => self.dashboard.histogram = histogram,
            Err(err) => self.report_view_error("minute histogram", &err),
        }
    }

    fn refresh_street_view(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        match data::top_streets(&table, self.control_panel.settings.affected) {
            Ok(streets) => self.dashboard.streets = streets,
            Err(err) => self.report_view_error("street ranking", &err),
        }
    }

    /// Derive the valid year interval from the loaded table; runs on load, not
    /// on year changes.
    fn refresh_year_bounds(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        match data::year_range(&table) {
            Ok(bounds) => self.control_panel.update_year_bounds(bounds),
            Err(err) => self.report_view_error("year range", &err),
        }
    }

    fn refresh_fatality_view(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        match data::killed_in_year(&table, self.control_panel.settings.year) {
            Ok(fatalities) => {
                self.dashboard.fatality_total =
                    data::fatality_total(&fatalities).unwrap_or_default();
                self.dashboard.fatalities = Some(fatalities);
            }
            Err(err) => self.report_view_error("fatality", &err),
        }
    }

    /// Recompute only the views whose controls changed since the last frame.
    fn apply_setting_changes(&mut self) {
        let Some(applied) = self.applied.clone() else {
            return;
        };
        let current = self.control_panel.settings.clone();
        if current == applied {
            return;
        }

        if current.min_injured != applied.min_injured {
            self.refresh_threshold_view();
        }
        if current.hour != applied.hour {
            self.refresh_hour_views();
        }
        if current.affected != applied.affected {
            self.refresh_street_view();
        }
        if current.year != applied.year {
            self.refresh_fatality_view();
        }
        // show_raw only toggles visibility; row_limit applies on reload.
        self.applied = Some(current);
    }

    fn handle_browse(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.set_data_path(path);
        }
    }

    fn handle_export(&mut self) {
        if !self.control_panel.loaded {
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("minute_histogram.png")
            .save_file()
        else {
            return;
        };

        let hour = self.control_panel.settings.hour;
        match export_minute_histogram(&path, hour, &self.dashboard.histogram) {
            Ok(()) => {
                info!(path = %path.display(), "exported minute histogram");
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
                if let Err(err) = open::that_detached(&path) {
                    warn!(%err, "could not open exported file");
                }
            }
            Err(err) => {
                error!(%err, "histogram export failed");
                self.control_panel.set_status(&format!("Error: {}", err));
            }
        }
    }
}

impl eframe::App for CrashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);
                    match action {
                        ControlPanelAction::BrowseData => self.handle_browse(),
                        ControlPanelAction::ReloadData => self.load_table(),
                        ControlPanelAction::ExportHistogram => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        self.apply_setting_changes();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard
                .show(ui, &self.control_panel.settings, self.control_panel.loaded);
        });
    }
}
