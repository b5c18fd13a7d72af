use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::error::QueryMiss;
use super::model::{Dataset, Indicator, Observation};

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------

/// Rows whose country is in `countries`, in original order.
///
/// An empty list selects nothing.
pub fn filter_by_countries<S: AsRef<str>>(dataset: &Dataset, countries: &[S]) -> Dataset {
    let wanted: BTreeSet<&str> = countries.iter().map(|c| c.as_ref()).collect();
    let rows = dataset
        .observations
        .iter()
        .filter(|obs| wanted.contains(obs.country.as_str()))
        .cloned()
        .collect();
    dataset.with_rows(rows)
}

/// Rows whose year lies in `years` (inclusive), in original order.
pub fn filter_by_years(dataset: &Dataset, years: RangeInclusive<i32>) -> Dataset {
    let rows = dataset
        .observations
        .iter()
        .filter(|obs| years.contains(&obs.year))
        .cloned()
        .collect();
    dataset.with_rows(rows)
}

fn rows_for<'a>(dataset: &'a Dataset, country: &'a str) -> impl Iterator<Item = &'a Observation> {
    dataset
        .observations
        .iter()
        .filter(move |obs| obs.country == country)
}

// ---------------------------------------------------------------------------
// Sidebar helpers
// ---------------------------------------------------------------------------

/// Sorted unique country names.
pub fn countries(dataset: &Dataset) -> Vec<String> {
    dataset
        .observations
        .iter()
        .map(|obs| obs.country.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `(min, max)` year, or `None` for an empty dataset.
pub fn year_span(dataset: &Dataset) -> Option<(i32, i32)> {
    let min = dataset.observations.iter().map(|o| o.year).min()?;
    let max = dataset.observations.iter().map(|o| o.year).max()?;
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Time series and raw table
// ---------------------------------------------------------------------------

/// `(year, value)` points for one country, missing values skipped, sorted by year.
pub fn series(dataset: &Dataset, country: &str, indicator: Indicator) -> Vec<(i32, f64)> {
    let mut points: Vec<(i32, f64)> = rows_for(dataset, country)
        .filter_map(|obs| obs.get(indicator).map(|v| (obs.year, v)))
        .collect();
    points.sort_by_key(|&(year, _)| year);
    points
}

/// One line of the raw-data table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub year: i32,
    pub country: String,
    /// One cell per requested indicator, same order.
    pub values: Vec<Option<f64>>,
}

/// `year, country_name, <indicators...>` for rows of the given countries.
pub fn table_rows<S: AsRef<str>>(
    dataset: &Dataset,
    countries: &[S],
    indicators: &[Indicator],
) -> Vec<TableRow> {
    filter_by_countries(dataset, countries)
        .observations
        .into_iter()
        .map(|obs| TableRow {
            year: obs.year,
            values: indicators.iter().map(|&ind| obs.get(ind)).collect(),
            country: obs.country,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Latest-year difference
// ---------------------------------------------------------------------------

/// Both countries' values in the dataset's latest year, and their difference.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestDifference {
    pub year: i32,
    pub indicator: Indicator,
    pub country_a: String,
    pub country_b: String,
    pub value_a: f64,
    pub value_b: f64,
    /// `value_a - value_b`, rounded to two decimals.
    pub diff: f64,
}

/// Round to two decimals, exact ties to even. Symmetric around zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Compare two countries on `indicator` in the latest year of `dataset`.
///
/// The latest year is taken over the whole dataset, not per country, so a
/// country with no row in that year yields [`QueryMiss::MissingValue`].
pub fn latest_year_difference(
    dataset: &Dataset,
    country_a: &str,
    country_b: &str,
    indicator: Indicator,
) -> Result<LatestDifference, QueryMiss> {
    let (_, year) = year_span(dataset).ok_or(QueryMiss::InsufficientData)?;

    let value_at = |country: &str| {
        rows_for(dataset, country)
            .find(|obs| obs.year == year)
            .and_then(|obs| obs.get(indicator))
            .ok_or_else(|| QueryMiss::MissingValue {
                country: country.to_string(),
                year,
                indicator,
            })
    };

    let value_a = value_at(country_a)?;
    let value_b = value_at(country_b)?;
    let diff = round2(value_a - value_b);

    log::debug!("{indicator} {year}: {country_a}={value_a} {country_b}={value_b} diff={diff}");

    Ok(LatestDifference {
        year,
        indicator,
        country_a: country_a.to_string(),
        country_b: country_b.to_string(),
        value_a,
        value_b,
        diff,
    })
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square, symmetric matrix of Pearson coefficients, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub indicators: Vec<Indicator>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.indicators.len()
    }

    /// Coefficient at `(row, col)`. NaN where undefined.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    /// Coefficient for a pair of indicators, `None` if either is not in the matrix.
    pub fn get(&self, a: Indicator, b: Indicator) -> Option<f64> {
        let row = self.indicators.iter().position(|&i| i == a)?;
        let col = self.indicators.iter().position(|&i| i == b)?;
        Some(self.at(row, col))
    }
}

/// Pairwise-complete Pearson correlation of `xs` against `ys`.
///
/// Only positions where both sides are present contribute. NaN with fewer
/// than two complete pairs or zero variance on either side.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Correlation between every pair of loaded indicators over one country's rows.
pub fn correlation_matrix(dataset: &Dataset, country: &str) -> CorrelationMatrix {
    let indicators = dataset.schema.indicators();
    let columns: Vec<Vec<Option<f64>>> = indicators
        .iter()
        .map(|&ind| rows_for(dataset, country).map(|obs| obs.get(ind)).collect())
        .collect();

    let n = indicators.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            // Exact 1.0 on the diagonal instead of a rounding artefact.
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix { indicators, values }
}

// ---------------------------------------------------------------------------
// Scatter rows
// ---------------------------------------------------------------------------

/// A field that can drive a scatter plot channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterField {
    Year,
    Indicator(Indicator),
}

impl ScatterField {
    fn read(self, obs: &Observation) -> Option<f64> {
        match self {
            ScatterField::Year => Some(f64::from(obs.year)),
            ScatterField::Indicator(ind) => obs.get(ind),
        }
    }
}

/// One complete point of the scatter plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRow {
    pub year: i32,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: f64,
}

/// One country's rows projected to four channels, incomplete rows dropped.
///
/// An empty result means there is not enough data for this combination.
pub fn scatter_rows(
    dataset: &Dataset,
    country: &str,
    x: Indicator,
    y: Indicator,
    size: Indicator,
    color: ScatterField,
) -> Vec<ScatterRow> {
    rows_for(dataset, country)
        .filter_map(|obs| {
            Some(ScatterRow {
                year: obs.year,
                x: obs.get(x)?,
                y: obs.get(y)?,
                size: obs.get(size)?,
                color: color.read(obs)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::IndicatorSchema;

    fn sample() -> Dataset {
        let rows = vec![
            Observation::new("A", 2019)
                .with(Indicator::Gdp, 90.0)
                .with(Indicator::InflationCpi, 1.0)
                .with(Indicator::UnemploymentRate, 5.0),
            Observation::new("B", 2019)
                .with(Indicator::Gdp, 70.0)
                .with(Indicator::InflationCpi, 2.0),
            Observation::new("A", 2020)
                .with(Indicator::Gdp, 100.0)
                .with(Indicator::InflationCpi, 2.0)
                .with(Indicator::UnemploymentRate, 4.0),
            Observation::new("B", 2020)
                .with(Indicator::Gdp, 80.0)
                .with(Indicator::InflationCpi, 2.5),
            Observation::new("A", 2021)
                .with(Indicator::Gdp, 120.0)
                .with(Indicator::InflationCpi, 3.0)
                .with(Indicator::UnemploymentRate, 3.0),
            Observation::new("B", 2021).with(Indicator::InflationCpi, 3.5),
            Observation::new("C", 2021).with(Indicator::Gdp, 50.0),
        ];
        Dataset::new(rows, IndicatorSchema::full())
    }

    #[test]
    fn filter_by_countries_keeps_order_and_handles_edges() {
        let ds = sample();
        assert!(filter_by_countries::<&str>(&ds, &[]).is_empty());

        let all = countries(&ds);
        assert_eq!(filter_by_countries(&ds, &all).len(), ds.len());

        let b_then_a = filter_by_countries(&ds, &["B", "A"]);
        let order: Vec<(&str, i32)> = b_then_a
            .observations
            .iter()
            .map(|o| (o.country.as_str(), o.year))
            .collect();
        assert_eq!(
            order,
            vec![("A", 2019), ("B", 2019), ("A", 2020), ("B", 2020), ("A", 2021), ("B", 2021)]
        );
    }

    #[test]
    fn filter_by_countries_ignores_unknown_names() {
        assert!(filter_by_countries(&sample(), &["Atlantis"]).is_empty());
    }

    #[test]
    fn filter_by_years_is_inclusive() {
        let ds = filter_by_years(&sample(), 2019..=2020);
        assert_eq!(ds.len(), 4);
        assert!(ds.observations.iter().all(|o| o.year <= 2020));
    }

    #[test]
    fn countries_are_sorted_and_unique() {
        assert_eq!(countries(&sample()), vec!["A", "B", "C"]);
    }

    #[test]
    fn series_skips_missing_values() {
        let pts = series(&sample(), "B", Indicator::Gdp);
        assert_eq!(pts, vec![(2019, 70.0), (2020, 80.0)]);
    }

    #[test]
    fn latest_difference_uses_global_max_year() {
        let ds = sample();
        // 2021 is the latest year; B has no GDP there.
        let miss = latest_year_difference(&ds, "A", "B", Indicator::Gdp).unwrap_err();
        assert_eq!(
            miss,
            QueryMiss::MissingValue {
                country: "B".into(),
                year: 2021,
                indicator: Indicator::Gdp,
            }
        );

        let diff = latest_year_difference(&ds, "A", "C", Indicator::Gdp).unwrap();
        assert_eq!(diff.year, 2021);
        assert_eq!(diff.diff, 70.0);
    }

    #[test]
    fn latest_difference_rounds_to_two_decimals() {
        let ds = sample();
        let d = latest_year_difference(&ds, "A", "B", Indicator::InflationCpi).unwrap();
        assert_eq!(d.diff, -0.5);
        let rows = vec![
            Observation::new("X", 2000).with(Indicator::Gdp, 1.006),
            Observation::new("Y", 2000).with(Indicator::Gdp, 0.0),
        ];
        let ds = Dataset::new(rows, IndicatorSchema::full());
        let d = latest_year_difference(&ds, "X", "Y", Indicator::Gdp).unwrap();
        assert!((d.diff - 1.01).abs() < 1e-12);
    }

    #[test]
    fn round2_sends_ties_to_even() {
        assert_eq!(round2(2.125), 2.12);
        assert_eq!(round2(-2.125), -2.12);
        assert_eq!(round2(2.135), 2.13);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn tied_difference_negates_when_countries_swap() {
        let rows = vec![
            Observation::new("X", 2000).with(Indicator::Gdp, 2.125),
            Observation::new("Y", 2000).with(Indicator::Gdp, 0.0),
        ];
        let ds = Dataset::new(rows, IndicatorSchema::full());
        let xy = latest_year_difference(&ds, "X", "Y", Indicator::Gdp).unwrap();
        let yx = latest_year_difference(&ds, "Y", "X", Indicator::Gdp).unwrap();
        assert_eq!(xy.diff, 2.12);
        assert_eq!(yx.diff, -2.12);
    }

    #[test]
    fn latest_difference_is_antisymmetric() {
        let ds = sample();
        for ind in [Indicator::Gdp, Indicator::InflationCpi] {
            let ab = latest_year_difference(&ds, "A", "C", ind).ok();
            let ba = latest_year_difference(&ds, "C", "A", ind).ok();
            match (ab, ba) {
                (Some(ab), Some(ba)) => assert_eq!(ab.diff, -ba.diff),
                (None, None) => {}
                other => panic!("asymmetric availability: {other:?}"),
            }
        }
    }

    #[test]
    fn latest_difference_on_empty_dataset_is_insufficient() {
        let ds = Dataset::default();
        assert_eq!(
            latest_year_difference(&ds, "A", "B", Indicator::Gdp),
            Err(QueryMiss::InsufficientData)
        );
    }

    #[test]
    fn pearson_handles_perfect_and_degenerate_inputs() {
        let xs = [Some(1.0), Some(2.0), Some(3.0)];
        let ys = [Some(2.0), Some(4.0), Some(6.0)];
        let neg = [Some(3.0), Some(2.0), Some(1.0)];
        let flat = [Some(5.0), Some(5.0), Some(5.0)];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &neg) + 1.0).abs() < 1e-12);
        assert!(pearson(&xs, &flat).is_nan());
        assert!(pearson(&[Some(1.0)], &[Some(1.0)]).is_nan());
    }

    #[test]
    fn pearson_is_pairwise_complete() {
        let xs = [Some(1.0), None, Some(2.0), Some(3.0)];
        let ys = [Some(10.0), Some(-100.0), Some(20.0), Some(30.0)];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let m = correlation_matrix(&sample(), "A");
        assert_eq!(m.size(), Indicator::COUNT);
        for i in 0..m.size() {
            for j in 0..m.size() {
                let (a, b) = (m.at(i, j), m.at(j, i));
                assert!(a.is_nan() && b.is_nan() || a == b);
                if !a.is_nan() {
                    assert!((-1.0..=1.0).contains(&a));
                }
            }
        }
        assert_eq!(m.get(Indicator::Gdp, Indicator::Gdp), Some(1.0));
        // Unemployment falls as GDP rises.
        let r = m.get(Indicator::Gdp, Indicator::UnemploymentRate).unwrap();
        assert!(r < -0.9);
        // No data at all for public debt.
        assert!(m.get(Indicator::PublicDebt, Indicator::PublicDebt).unwrap().is_nan());
    }

    #[test]
    fn correlation_matrix_only_covers_loaded_indicators() {
        let mut ds = sample();
        ds.schema = IndicatorSchema::from_indicators([Indicator::Gdp, Indicator::InflationCpi]);
        let m = correlation_matrix(&ds, "A");
        assert_eq!(m.indicators, vec![Indicator::InflationCpi, Indicator::Gdp]);
        assert_eq!(m.get(Indicator::PublicDebt, Indicator::Gdp), None);
    }

    #[test]
    fn scatter_rows_drop_incomplete_rows() {
        let ds = sample();
        let rows = scatter_rows(
            &ds,
            "A",
            Indicator::InflationCpi,
            Indicator::UnemploymentRate,
            Indicator::Gdp,
            ScatterField::Year,
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].color, 2019.0);

        let b = scatter_rows(
            &ds,
            "B",
            Indicator::InflationCpi,
            Indicator::Gdp,
            Indicator::Gdp,
            ScatterField::Year,
        );
        assert_eq!(b.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2019, 2020]);
    }

    #[test]
    fn scatter_rows_empty_when_axis_always_missing() {
        let rows = scatter_rows(
            &sample(),
            "C",
            Indicator::InflationCpi,
            Indicator::Gdp,
            Indicator::Gdp,
            ScatterField::Year,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn table_rows_project_selected_indicators() {
        let rows = table_rows(&sample(), &["C"], &[Indicator::Gdp, Indicator::PublicDebt]);
        assert_eq!(
            rows,
            vec![TableRow {
                year: 2021,
                country: "C".into(),
                values: vec![Some(50.0), None],
            }]
        );
    }
}
