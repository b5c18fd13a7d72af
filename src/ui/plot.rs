use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use macro_dash::color;
use macro_dash::data::QueryMiss;
use macro_dash::data::insight::{Insight, Standing};

use crate::state::{AppState, ComparisonView};
use crate::ui::table;

const SUCCESS: Color32 = Color32::from_rgb(60, 170, 90);
const FAILURE: Color32 = Color32::from_rgb(215, 70, 70);
const INFO: Color32 = Color32::from_rgb(70, 140, 215);
const WARNING: Color32 = Color32::from_rgb(220, 170, 40);

/// Neutral notice for a view that has nothing to show.
pub fn notice(ui: &mut Ui, miss: &QueryMiss) {
    ui.label(RichText::new(format!("⚠ {miss}")).color(WARNING));
}

// ---------------------------------------------------------------------------
// Country comparison (line charts + insights)
// ---------------------------------------------------------------------------

pub fn comparison_page(ui: &mut Ui, state: &AppState) {
    ui.heading("📈 International Macroeconomic Comparison");

    let views = state.comparison_views();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for view in &views {
                comparison_chart(ui, state, view);
                ui.add_space(12.0);
            }

            egui::CollapsingHeader::new("📊 Show Raw Data Table")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    table::raw_table(ui, &state.indicators, &state.raw_table());
                });
        });
}

fn comparison_chart(ui: &mut Ui, state: &AppState, view: &ComparisonView) {
    ui.strong(view.indicator.name());

    Plot::new(("comparison", view.indicator.index()))
        .legend(Legend::default())
        .height(240.0)
        .x_axis_label("year")
        .y_axis_label(view.indicator.name())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (country, points) in &view.series {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(country))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let points: PlotPoints = points
                    .iter()
                    .map(|&(year, value)| [f64::from(year), value])
                    .collect();
                plot_ui.line(Line::new(points).name(country).color(color).width(2.0));
            }
        });

    match &view.insight {
        Ok(insight) => insight_label(ui, insight),
        // A missing latest-year value silently skips the insight.
        Err(QueryMiss::MissingValue { .. }) => {}
        Err(miss) => notice(ui, miss),
    }
}

fn insight_label(ui: &mut Ui, insight: &Insight) {
    let color = match insight.standing {
        Standing::Higher(_) => SUCCESS,
        Standing::Lower(_) => FAILURE,
        Standing::Equal => INFO,
    };
    ui.label(RichText::new(&insight.message).color(color));
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

pub fn scatter_page(ui: &mut Ui, state: &AppState) {
    ui.heading(format!("📌 Scatter Plot – {}", state.country1));
    ui.label(format!(
        "{} vs {} ({}), sized by {}, coloured by year",
        state.scatter_x,
        state.scatter_y,
        state.country1,
        macro_dash::data::Indicator::Gdp
    ));

    let rows = match state.scatter() {
        Ok(rows) => rows,
        Err(miss) => {
            notice(ui, &miss);
            return;
        }
    };

    let max_size = rows.iter().map(|r| r.size.abs()).fold(0.0, f64::max);
    let (min_year, max_year) = rows
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.color), hi.max(r.color))
        });

    Plot::new("scatter_plot")
        .x_axis_label(state.scatter_x.name())
        .y_axis_label(state.scatter_y.name())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for row in &rows {
                let radius = if max_size > 0.0 {
                    3.0 + 12.0 * (row.size.abs() / max_size).sqrt()
                } else {
                    5.0
                };
                let point = Points::new(vec![[row.x, row.y]])
                    .name(row.year.to_string())
                    .radius(radius as f32)
                    .color(color::sequential(row.color, min_year, max_year));
                plot_ui.points(point);
            }
        });
}
