use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, vec2};

use macro_dash::color;
use macro_dash::data::query::CorrelationMatrix;

use crate::state::AppState;

const CELL: f32 = 46.0;

// ---------------------------------------------------------------------------
// Correlation heatmap (central panel)
// ---------------------------------------------------------------------------

pub fn heatmap_page(ui: &mut Ui, state: &AppState) {
    ui.heading(format!("📊 Correlation Heatmap – {}", state.country1));

    let Some(matrix) = state.heatmap() else {
        return;
    };
    if matrix.size() == 0 {
        ui.label("No indicator columns in the loaded dataset.");
        return;
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| heatmap_grid(ui, &matrix));
}

/// Rows labelled with the full indicator name, columns with its number.
fn heatmap_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    egui::Grid::new("correlation_grid")
        .spacing(vec2(2.0, 2.0))
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in 0..matrix.size() {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.strong((col + 1).to_string())
                        .on_hover_text(matrix.indicators[col].name());
                });
            }
            ui.end_row();

            for row in 0..matrix.size() {
                ui.label(format!("{}. {}", row + 1, matrix.indicators[row]));
                for col in 0..matrix.size() {
                    cell(ui, matrix, row, col);
                }
                ui.end_row();
            }
        });
}

fn cell(ui: &mut Ui, matrix: &CorrelationMatrix, row: usize, col: usize) {
    let value = matrix.at(row, col);
    let (rect, response) = ui.allocate_exact_size(vec2(CELL, CELL * 0.6), Sense::hover());
    let fill = color::diverging(value);
    ui.painter().rect_filled(rect, 2.0, fill);

    let text = if value.is_nan() {
        String::from("–")
    } else {
        format!("{value:.2}")
    };
    let ink = if fill.r() as u32 + fill.g() as u32 + fill.b() as u32 > 400 {
        Color32::BLACK
    } else {
        Color32::WHITE
    };
    ui.painter()
        .text(rect.center(), Align2::CENTER_CENTER, text, FontId::monospace(11.0), ink);

    response.on_hover_text(format!(
        "{} × {}",
        matrix.indicators[row], matrix.indicators[col]
    ));
}
