use eframe::egui;

use macro_dash::config::DashboardConfig;

use crate::state::{AppState, Section};
use crate::ui::{heatmap, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MacroDashApp {
    pub state: AppState,
}

impl MacroDashApp {
    /// Build the app and load the configured dataset once.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        panels::load_configured(&mut state);
        Self { state }
    }
}

impl eframe::App for MacroDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active section ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a dataset to start  (File → Open…)");
                });
                return;
            }
            match self.state.section {
                Section::Compare => plot::comparison_page(ui, &self.state),
                Section::Correlation => heatmap::heatmap_page(ui, &self.state),
                Section::Scatter => plot::scatter_page(ui, &self.state),
            }
        });
    }
}
