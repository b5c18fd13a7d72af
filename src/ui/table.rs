use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use macro_dash::data::Indicator;
use macro_dash::data::query::TableRow;

/// Render `year, country_name, <indicators...>` rows. Missing cells are blank.
pub fn raw_table(ui: &mut Ui, indicators: &[Indicator], rows: &[TableRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .column(Column::auto())
        .columns(Column::auto().clip(true), indicators.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("year");
            });
            header.col(|ui| {
                ui.strong("country_name");
            });
            for indicator in indicators {
                header.col(|ui| {
                    ui.strong(indicator.name());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let record = &rows[row.index()];
                row.col(|ui| {
                    ui.label(record.year.to_string());
                });
                row.col(|ui| {
                    ui.label(record.country.as_str());
                });
                for value in &record.values {
                    row.col(|ui| {
                        if let Some(v) = value {
                            ui.monospace(format_cell(*v));
                        }
                    });
                }
            });
        });
}

/// Large magnitudes (GDP, GNI) in scientific notation, the rest to 2 decimals.
fn format_cell(v: f64) -> String {
    if v.abs() >= 1e7 {
        format!("{v:.3e}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_switch_to_scientific_for_large_values() {
        assert_eq!(format_cell(2.5), "2.50");
        assert_eq!(format_cell(-0.126), "-0.13");
        assert_eq!(format_cell(2.5e11), "2.500e11");
    }
}
