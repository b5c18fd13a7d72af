use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::QueryMiss;

// ---------------------------------------------------------------------------
// Indicator – the fixed set of macroeconomic columns
// ---------------------------------------------------------------------------

/// One of the thirteen indicator columns the dashboard knows about.
///
/// The header strings are matched exactly (after trimming), so the variant
/// order here is also the column order used by tables and the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    InflationCpi,
    Gdp,
    GdpPerCapita,
    UnemploymentRate,
    RealInterestRate,
    InflationGdpDeflator,
    GdpGrowth,
    CurrentAccountBalance,
    GovernmentExpense,
    GovernmentRevenue,
    TaxRevenue,
    GrossNationalIncome,
    PublicDebt,
}

impl Indicator {
    pub const COUNT: usize = 13;

    pub const ALL: [Indicator; Indicator::COUNT] = [
        Indicator::InflationCpi,
        Indicator::Gdp,
        Indicator::GdpPerCapita,
        Indicator::UnemploymentRate,
        Indicator::RealInterestRate,
        Indicator::InflationGdpDeflator,
        Indicator::GdpGrowth,
        Indicator::CurrentAccountBalance,
        Indicator::GovernmentExpense,
        Indicator::GovernmentRevenue,
        Indicator::TaxRevenue,
        Indicator::GrossNationalIncome,
        Indicator::PublicDebt,
    ];

    /// Exact column header for this indicator.
    pub fn name(self) -> &'static str {
        match self {
            Indicator::InflationCpi => "Inflation (CPI %)",
            Indicator::Gdp => "GDP (Current USD)",
            Indicator::GdpPerCapita => "GDP per Capita (Current USD)",
            Indicator::UnemploymentRate => "Unemployment Rate (%)",
            Indicator::RealInterestRate => "Interest Rate (Real, %)",
            Indicator::InflationGdpDeflator => "Inflation (GDP Deflator, %)",
            Indicator::GdpGrowth => "GDP Growth (% Annual)",
            Indicator::CurrentAccountBalance => "Current Account Balance (% GDP)",
            Indicator::GovernmentExpense => "Government Expense (% of GDP)",
            Indicator::GovernmentRevenue => "Government Revenue (% of GDP)",
            Indicator::TaxRevenue => "Tax Revenue (% of GDP)",
            Indicator::GrossNationalIncome => "Gross National Income (USD)",
            Indicator::PublicDebt => "Public Debt (% of GDP)",
        }
    }

    /// Position in [`Indicator::ALL`], used to index observation values.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Indicator {
    type Err = QueryMiss;

    /// Trims the input, then requires an exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Indicator::ALL
            .iter()
            .copied()
            .find(|ind| ind.name() == trimmed)
            .ok_or_else(|| QueryMiss::UnknownIndicator(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the source table
// ---------------------------------------------------------------------------

/// One `(country, year)` record. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub values: [Option<f64>; Indicator::COUNT],
}

impl Observation {
    /// A row with every indicator missing.
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Observation {
            country: country.into(),
            year,
            values: [None; Indicator::COUNT],
        }
    }

    /// Builder-style setter, handy for assembling rows in loaders and tests.
    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        self.values[indicator.index()] = Some(value);
        self
    }

    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        self.values[indicator.index()]
    }

    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        self.values[indicator.index()] = value;
    }
}

// ---------------------------------------------------------------------------
// IndicatorSchema – which indicators the loaded header carries
// ---------------------------------------------------------------------------

/// The subset of [`Indicator::ALL`] present in the loaded file's header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSchema {
    present: BTreeSet<Indicator>,
}

impl IndicatorSchema {
    /// Schema carrying every known indicator.
    pub fn full() -> Self {
        IndicatorSchema {
            present: Indicator::ALL.iter().copied().collect(),
        }
    }

    pub fn from_indicators(indicators: impl IntoIterator<Item = Indicator>) -> Self {
        IndicatorSchema {
            present: indicators.into_iter().collect(),
        }
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.present.contains(&indicator)
    }

    /// Present indicators, in canonical column order.
    pub fn indicators(&self) -> Vec<Indicator> {
        self.present.iter().copied().collect()
    }

    /// Resolve a user-supplied name against the loaded header.
    pub fn lookup(&self, name: &str) -> Result<Indicator, QueryMiss> {
        let indicator: Indicator = name.parse()?;
        if self.contains(indicator) {
            Ok(indicator)
        } else {
            Err(QueryMiss::IndicatorNotLoaded(indicator))
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Read-only once built.
///
/// `(country, year)` pairs are expected to be unique; this is not enforced.
/// Lookups that need a single row take the first match in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub schema: IndicatorSchema,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>, schema: IndicatorSchema) -> Self {
        Dataset {
            observations,
            schema,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of rows sharing a `(country, year)` key with an earlier row.
    pub fn duplicate_keys(&self) -> usize {
        let mut seen = BTreeSet::new();
        self.observations
            .iter()
            .filter(|obs| !seen.insert((obs.country.as_str(), obs.year)))
            .count()
    }

    /// Same schema, different rows.
    pub(crate) fn with_rows(&self, observations: Vec<Observation>) -> Dataset {
        Dataset {
            observations,
            schema: self.schema.clone(),
        }
    }
}
