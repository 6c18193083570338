//! Crashboard - Interactive dashboard for NYC motor vehicle collision data
//!
//! Loads the collision CSV once, then recomputes filtered views as the
//! controls change. Optionally takes the CSV path as the first argument.

mod charts;
mod config;
mod data;
mod gui;

use eframe::egui;
use gui::CrashboardApp;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let data_path = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Crashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Crashboard",
        options,
        Box::new(|cc| Ok(Box::new(CrashboardApp::new(cc, data_path)))),
    )
}
