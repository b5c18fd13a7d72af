use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use macro_dash::data::Indicator;

use crate::state::{AppState, Section};

// ---------------------------------------------------------------------------
// Left side panel – section and selection widgets
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🌍 Macro Dashboard");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select Analysis Section");
            for section in Section::ALL {
                ui.radio_value(&mut state.section, section, section.label());
            }
            ui.separator();

            // Clone so the combo boxes can mutate state while iterating.
            let countries = state.countries.clone();
            country_combo(ui, "country1", "Select Country 1", &countries, &mut state.country1);
            country_combo(ui, "country2", "Select Country 2", &countries, &mut state.country2);
            ui.separator();

            match state.section {
                Section::Compare => compare_controls(ui, state),
                Section::Scatter => scatter_controls(ui, state),
                Section::Correlation => {}
            }
        });
}

fn country_combo(ui: &mut Ui, id: &str, label: &str, countries: &[String], current: &mut String) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for country in countries {
                ui.selectable_value(current, country.clone(), country.as_str());
            }
        });
}

fn compare_controls(ui: &mut Ui, state: &mut AppState) {
    if let Some((min, max)) = state.year_span {
        ui.strong("Years");
        let (first, last) = &mut state.year_range;
        ui.add(egui::Slider::new(first, min..=max).text("from"));
        ui.add(egui::Slider::new(last, min..=max).text("to"));
        if *first > *last {
            std::mem::swap(first, last);
        }
        ui.separator();
    }

    ui.strong("Select indicators to compare");
    let available = state
        .dataset
        .as_ref()
        .map(|ds| ds.schema.indicators())
        .unwrap_or_default();
    for indicator in available {
        let mut checked = state.indicators.contains(&indicator);
        if ui.checkbox(&mut checked, indicator.name()).changed() {
            state.toggle_indicator(indicator);
        }
    }
}

fn scatter_controls(ui: &mut Ui, state: &mut AppState) {
    let available = state
        .dataset
        .as_ref()
        .map(|ds| ds.schema.indicators())
        .unwrap_or_default();
    indicator_combo(ui, "scatter_x", "X-axis Indicator", &available, &mut state.scatter_x);
    indicator_combo(ui, "scatter_y", "Y-axis Indicator", &available, &mut state.scatter_y);
}

fn indicator_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    available: &[Indicator],
    current: &mut Indicator,
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.name())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for &indicator in available {
                ui.selectable_value(current, indicator, indicator.name());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            // The dataset is fixed for the session once loaded.
            let enabled = state.dataset.is_none();
            if ui.add_enabled(enabled, egui::Button::new("Open…")).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations, {} countries",
                ds.len(),
                state.countries.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Startup load and file dialog
// ---------------------------------------------------------------------------

/// Load the configured dataset; on failure leave a status message so the
/// user can pick a file instead.
pub fn load_configured(state: &mut AppState) {
    let path = state.config.data_path.clone();
    load_path(state, &path);
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_path(state, &path);
    }
}

fn load_path(state: &mut AppState, path: &std::path::Path) {
    match macro_dash::data::loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} with {} observations",
                path.display(),
                dataset.len()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
