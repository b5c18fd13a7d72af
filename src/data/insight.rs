use std::fmt;

use super::query::LatestDifference;

// ---------------------------------------------------------------------------
// Standing – which country leads in the latest year
// ---------------------------------------------------------------------------

/// Outcome of comparing the first selected country against the second.
///
/// The payload is always the country that leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Standing {
    /// The first country is higher.
    Higher(String),
    /// The first country is lower; the second country leads.
    Lower(String),
    Equal,
}

/// A rendered auto-insight for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub standing: Standing,
    pub message: String,
}

impl Insight {
    pub fn from_difference(d: &LatestDifference) -> Self {
        let standing = if d.diff > 0.0 {
            Standing::Higher(d.country_a.clone())
        } else if d.diff < 0.0 {
            Standing::Lower(d.country_b.clone())
        } else {
            Standing::Equal
        };

        let message = match &standing {
            Standing::Higher(leader) | Standing::Lower(leader) => format!(
                "In {}, {leader} had a higher {} by {}",
                d.year,
                d.indicator,
                Amount(d.diff.abs())
            ),
            Standing::Equal => format!(
                "In {}, both countries had the same {}.",
                d.year, d.indicator
            ),
        };

        Insight { standing, message }
    }
}

/// Formats a float the way a dashboard reader expects: whole numbers keep
/// one decimal (`20.0`), everything else prints its shortest form.
struct Amount(f64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Indicator;

    fn diff(a: f64, b: f64) -> LatestDifference {
        LatestDifference {
            year: 2020,
            indicator: Indicator::Gdp,
            country_a: "CountryA".into(),
            country_b: "CountryB".into(),
            value_a: a,
            value_b: b,
            diff: crate::data::query::round2(a - b),
        }
    }

    #[test]
    fn first_country_higher() {
        let insight = Insight::from_difference(&diff(100.0, 80.0));
        assert_eq!(insight.standing, Standing::Higher("CountryA".into()));
        assert_eq!(
            insight.message,
            "In 2020, CountryA had a higher GDP (Current USD) by 20.0"
        );
    }

    #[test]
    fn second_country_higher_reports_absolute_difference() {
        let insight = Insight::from_difference(&diff(1.25, 3.5));
        assert_eq!(insight.standing, Standing::Lower("CountryB".into()));
        assert_eq!(
            insight.message,
            "In 2020, CountryB had a higher GDP (Current USD) by 2.25"
        );
    }

    #[test]
    fn equal_values() {
        let insight = Insight::from_difference(&diff(7.001, 7.0));
        assert_eq!(insight.standing, Standing::Equal);
        assert_eq!(
            insight.message,
            "In 2020, both countries had the same GDP (Current USD)."
        );
    }
}
