use std::sync::Arc;

use macro_dash::color::ColorMap;
use macro_dash::config::DashboardConfig;
use macro_dash::data::insight::Insight;
use macro_dash::data::query::{self, CorrelationMatrix, ScatterField, ScatterRow, TableRow};
use macro_dash::data::{Dataset, Indicator, QueryMiss};

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// Which analysis page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Compare,
    Correlation,
    Scatter,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Compare, Section::Correlation, Section::Scatter];

    pub fn label(self) -> &'static str {
        match self {
            Section::Compare => "Compare Countries",
            Section::Correlation => "Correlation Heatmap",
            Section::Scatter => "Scatter Plot",
        }
    }
}

/// Everything the comparison page draws for one indicator.
pub struct ComparisonView {
    pub indicator: Indicator,
    /// `(country, points)` for the two selected countries.
    pub series: Vec<(String, Vec<(i32, f64)>)>,
    pub insight: Result<Insight, QueryMiss>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Views are recomputed from
/// the dataset on every call and never cached.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset. Set once, never replaced.
    pub dataset: Option<Arc<Dataset>>,

    /// Sorted country list for the selectors.
    pub countries: Vec<String>,

    /// Full year span of the dataset.
    pub year_span: Option<(i32, i32)>,

    pub section: Section,
    pub country1: String,
    pub country2: String,

    /// Indicators shown on the comparison page, in selection order.
    pub indicators: Vec<Indicator>,

    /// Inclusive year filter for the comparison page.
    pub year_range: (i32, i32),

    pub scatter_x: Indicator,
    pub scatter_y: Indicator,

    /// Stable per-country line colours.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let indicators = config.indicators();
        let (scatter_x, scatter_y) = config.scatter_axes();
        Self {
            config,
            dataset: None,
            countries: Vec::new(),
            year_span: None,
            section: Section::Compare,
            country1: String::new(),
            country2: String::new(),
            indicators,
            year_range: (0, 0),
            scatter_x,
            scatter_y,
            color_map: None,
            status_message: None,
        }
    }

    /// Ingest the dataset and initialise selections. Ignored if a dataset is
    /// already loaded: the data stays fixed for the whole session.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if self.dataset.is_some() {
            log::warn!("Dataset already loaded; ignoring second load");
            return;
        }

        self.countries = query::countries(&dataset);
        self.year_span = query::year_span(&dataset);
        self.year_range = self.year_span.unwrap_or((0, 0));

        // Defaults: first and second country, like the original selectboxes.
        self.country1 = self.countries.first().cloned().unwrap_or_default();
        self.country2 = self
            .countries
            .get(1)
            .or(self.countries.first())
            .cloned()
            .unwrap_or_default();

        self.indicators.retain(|ind| match dataset.schema.lookup(ind.name()) {
            Ok(_) => true,
            Err(miss) => {
                log::warn!("Dropping default indicator: {miss}");
                false
            }
        });
        let loaded = dataset.schema.indicators();
        self.scatter_x = clamp_axis(self.scatter_x, &loaded, 0);
        self.scatter_y = clamp_axis(self.scatter_y, &loaded, 1);
        self.color_map = Some(ColorMap::new(&self.countries));

        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
    }

    /// Add or remove an indicator from the comparison selection.
    pub fn toggle_indicator(&mut self, indicator: Indicator) {
        if let Some(pos) = self.indicators.iter().position(|&i| i == indicator) {
            self.indicators.remove(pos);
        } else {
            self.indicators.push(indicator);
        }
    }

    fn year_filtered(&self, dataset: &Dataset) -> Dataset {
        let (first, last) = self.year_range;
        query::filter_by_years(dataset, first..=last)
    }

    // -- Derived views --

    /// One chart + insight per selected indicator.
    pub fn comparison_views(&self) -> Vec<ComparisonView> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        let pair = [self.country1.as_str(), self.country2.as_str()];
        let visible = self.year_filtered(&query::filter_by_countries(dataset, &pair));
        // Latest year of the visible range, which is the dataset's latest
        // year unless the range was narrowed.
        let in_range = self.year_filtered(dataset);

        self.indicators
            .iter()
            .map(|&indicator| {
                let mut series = vec![(
                    self.country1.clone(),
                    query::series(&visible, &self.country1, indicator),
                )];
                if self.country2 != self.country1 {
                    series.push((
                        self.country2.clone(),
                        query::series(&visible, &self.country2, indicator),
                    ));
                }
                let insight = query::latest_year_difference(
                    &in_range,
                    &self.country1,
                    &self.country2,
                    indicator,
                )
                .map(|d| Insight::from_difference(&d));

                ComparisonView {
                    indicator,
                    series,
                    insight,
                }
            })
            .collect()
    }

    /// Raw table for the two selected countries and indicators.
    pub fn raw_table(&self) -> Vec<TableRow> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        let visible = self.year_filtered(dataset);
        query::table_rows(
            &visible,
            &[self.country1.as_str(), self.country2.as_str()],
            &self.indicators,
        )
    }

    pub fn heatmap(&self) -> Option<CorrelationMatrix> {
        let dataset = self.dataset.as_ref()?;
        Some(query::correlation_matrix(dataset, &self.country1))
    }

    /// Scatter points for the first country, sized by GDP, coloured by year.
    pub fn scatter(&self) -> Result<Vec<ScatterRow>, QueryMiss> {
        let dataset = self.dataset.as_ref().ok_or(QueryMiss::InsufficientData)?;
        for ind in [self.scatter_x, self.scatter_y, Indicator::Gdp] {
            if !dataset.schema.contains(ind) {
                return Err(QueryMiss::IndicatorNotLoaded(ind));
            }
        }
        let rows = query::scatter_rows(
            dataset,
            &self.country1,
            self.scatter_x,
            self.scatter_y,
            Indicator::Gdp,
            ScatterField::Year,
        );
        if rows.is_empty() {
            Err(QueryMiss::InsufficientData)
        } else {
            Ok(rows)
        }
    }
}

/// Keep `axis` if the file carries it, otherwise fall back to the
/// `fallback`-th loaded indicator (or the last one).
fn clamp_axis(axis: Indicator, loaded: &[Indicator], fallback: usize) -> Indicator {
    if loaded.contains(&axis) {
        return axis;
    }
    match loaded.get(fallback).or(loaded.last()) {
        Some(&replacement) => {
            log::warn!("{axis} is not in the loaded dataset; scatter axis set to {replacement}");
            replacement
        }
        None => axis,
    }
}
