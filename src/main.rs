mod app;
mod state;
mod ui;

use app::MacroDashApp;
use eframe::egui;
use macro_dash::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {e:#}");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Macro Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(MacroDashApp::new(config)))),
    )
}
