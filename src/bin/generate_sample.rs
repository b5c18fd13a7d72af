use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use macro_dash::data::Indicator;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Rough profile of one synthetic economy.
struct Profile {
    name: &'static str,
    gdp: f64,
    population: f64,
    inflation: f64,
    unemployment: f64,
    debt: f64,
}

const PROFILES: [Profile; 5] = [
    Profile {
        name: "Argentina",
        gdp: 4.5e11,
        population: 4.5e7,
        inflation: 40.0,
        unemployment: 9.5,
        debt: 80.0,
    },
    Profile {
        name: "Brazil",
        gdp: 1.6e12,
        population: 2.1e8,
        inflation: 6.0,
        unemployment: 11.0,
        debt: 85.0,
    },
    Profile {
        name: "Chile",
        gdp: 2.8e11,
        population: 1.9e7,
        inflation: 4.0,
        unemployment: 8.0,
        debt: 35.0,
    },
    Profile {
        name: "Germany",
        gdp: 4.0e12,
        population: 8.3e7,
        inflation: 2.0,
        unemployment: 3.5,
        debt: 65.0,
    },
    Profile {
        name: "Japan",
        gdp: 4.9e12,
        population: 1.25e8,
        inflation: 0.5,
        unemployment: 2.8,
        debt: 250.0,
    },
];

const YEARS: std::ops::RangeInclusive<i64> = 2010..=2025;

/// Share of cells left empty, so the dashboard's missing-data paths show up.
const MISSING_RATE: f64 = 0.06;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut countries: Vec<&str> = Vec::new();
    let mut years: Vec<i64> = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); Indicator::COUNT];

    for profile in &PROFILES {
        let mut gdp = profile.gdp;
        for year in YEARS {
            let growth = rng.gauss(2.0, 2.5);
            gdp *= 1.0 + growth / 100.0;
            let inflation =
                (profile.inflation + rng.gauss(0.0, profile.inflation * 0.3 + 0.5)).max(-1.0);
            let revenue = rng.gauss(30.0, 4.0);
            let unemployment =
                (profile.unemployment - growth * 0.3 + rng.gauss(0.0, 0.5)).max(0.5);

            let row = [
                (Indicator::InflationCpi, inflation),
                (Indicator::Gdp, gdp),
                (Indicator::GdpPerCapita, gdp / profile.population),
                (Indicator::UnemploymentRate, unemployment),
                (Indicator::RealInterestRate, rng.gauss(2.0, 1.5)),
                (Indicator::InflationGdpDeflator, inflation + rng.gauss(0.0, 1.0)),
                (Indicator::GdpGrowth, growth),
                (Indicator::CurrentAccountBalance, rng.gauss(0.0, 3.0)),
                (Indicator::GovernmentExpense, revenue + rng.gauss(3.0, 2.0)),
                (Indicator::GovernmentRevenue, revenue),
                (Indicator::TaxRevenue, revenue * 0.6),
                (Indicator::GrossNationalIncome, gdp * rng.gauss(0.98, 0.02)),
                (Indicator::PublicDebt, profile.debt + rng.gauss(0.0, 5.0)),
            ];

            countries.push(profile.name);
            years.push(year);
            for (ind, value) in row {
                let cell = (rng.next_f64() >= MISSING_RATE).then_some(value);
                columns[ind.index()].push(cell);
            }
        }
    }

    let mut fields = vec![
        Field::new("country_name", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(countries.clone())),
        Arc::new(Int64Array::from(years.clone())),
    ];
    for ind in Indicator::ALL {
        fields.push(Field::new(ind.name(), DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(columns[ind.index()].clone())));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    // Write Parquet
    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    // Write CSV with the same columns
    let csv_path = "sample_data.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    let mut header = vec!["country_name".to_string(), "year".to_string()];
    header.extend(Indicator::ALL.iter().map(|ind| ind.name().to_string()));
    csv_writer.write_record(&header)?;
    for row in 0..countries.len() {
        let mut record = vec![countries[row].to_string(), years[row].to_string()];
        record.extend(
            Indicator::ALL
                .iter()
                .map(|ind| columns[ind.index()][row].map(|v| v.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 3)])?);
    println!(
        "Wrote {} observations ({} countries, {} indicators) to {parquet_path} and {csv_path}",
        countries.len(),
        PROFILES.len(),
        Indicator::COUNT
    );
    Ok(())
}
