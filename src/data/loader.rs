use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::SchemaError;
use super::model::{Dataset, Indicator, IndicatorSchema, Observation};

pub const COUNTRY_COLUMN: &str = "country_name";
pub const YEAR_COLUMN: &str = "year";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an indicator dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, `country_name`, `year`, one column per indicator
/// * `.parquet` – same columns, numeric or string typed
/// * `.json`    – `[{ "country_name": "...", "year": 2020, ...indicators }, ...]`
///
/// Header names are trimmed before matching. Unknown columns are ignored.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let duplicates = dataset.duplicate_keys();
    if duplicates > 0 {
        log::warn!(
            "{duplicates} rows repeat an earlier (country, year) pair; lookups use the first"
        );
    }
    log::info!(
        "Loaded {} observations, {} of {} indicators present",
        dataset.len(),
        dataset.schema.indicators().len(),
        Indicator::COUNT
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Column positions resolved from a header.
struct HeaderMap {
    country: usize,
    year: usize,
    indicators: Vec<(Indicator, usize)>,
}

impl HeaderMap {
    fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, SchemaError> {
        let mut country = None;
        let mut year = None;
        let mut indicators = BTreeMap::new();

        for (idx, raw) in headers.into_iter().enumerate() {
            let name = raw.trim();
            match name {
                COUNTRY_COLUMN => country = country.or(Some(idx)),
                YEAR_COLUMN => year = year.or(Some(idx)),
                _ => {
                    if let Ok(ind) = name.parse::<Indicator>() {
                        indicators.entry(ind).or_insert(idx);
                    }
                }
            }
        }

        Ok(HeaderMap {
            country: country.ok_or(SchemaError::MissingColumn(COUNTRY_COLUMN))?,
            year: year.ok_or(SchemaError::MissingColumn(YEAR_COLUMN))?,
            indicators: indicators.into_iter().collect(),
        })
    }

    fn schema(&self) -> IndicatorSchema {
        IndicatorSchema::from_indicators(self.indicators.iter().map(|(ind, _)| *ind))
    }
}

/// Numeric cell; empty, non-numeric and NaN all read as missing.
fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Accepts `2020` as well as `2020.0`.
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    s.parse::<i32>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|y| y.fract() == 0.0 && y.abs() < f64::from(i32::MAX))
            .map(|y| y as i32)
    })
}

fn log_dropped(dropped: usize) {
    if dropped > 0 {
        log::warn!("Dropped {dropped} rows without a country name or year");
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let header_map = HeaderMap::resolve(headers.iter())?;

    let mut observations = Vec::new();
    let mut dropped = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let country = record.get(header_map.country).unwrap_or("").trim();
        let year = record.get(header_map.year).and_then(parse_year);
        let Some(year) = year.filter(|_| !country.is_empty()) else {
            dropped += 1;
            continue;
        };

        let mut obs = Observation::new(country, year);
        for &(ind, idx) in &header_map.indicators {
            obs.set(ind, record.get(idx).and_then(parse_value));
        }
        observations.push(obs);
    }

    log_dropped(dropped);
    Ok(Dataset::new(observations, header_map.schema()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` shape:
///
/// ```json
/// [
///   { "country_name": "Chile", "year": 2020, "GDP (Current USD)": 2.5e11, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut present = BTreeSet::new();
    let mut seen_country = false;
    let mut seen_year = false;
    let mut observations = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut country = None;
        let mut year = None;
        let mut cells = Vec::new();
        for (key, val) in obj {
            match key.trim() {
                COUNTRY_COLUMN => {
                    seen_country = true;
                    country = val.as_str().map(str::trim).filter(|c| !c.is_empty());
                }
                YEAR_COLUMN => {
                    seen_year = true;
                    year = json_year(val);
                }
                name => {
                    if let Ok(ind) = name.parse::<Indicator>() {
                        present.insert(ind);
                        cells.push((ind, json_value(val)));
                    }
                }
            }
        }

        let (Some(country), Some(year)) = (country, year) else {
            dropped += 1;
            continue;
        };
        let mut obs = Observation::new(country, year);
        for (ind, value) in cells {
            obs.set(ind, value);
        }
        observations.push(obs);
    }

    if !records.is_empty() {
        if !seen_country {
            return Err(SchemaError::MissingColumn(COUNTRY_COLUMN).into());
        }
        if !seen_year {
            return Err(SchemaError::MissingColumn(YEAR_COLUMN).into());
        }
    }

    log_dropped(dropped);
    Ok(Dataset::new(observations, IndicatorSchema::from_indicators(present)))
}

fn json_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .or_else(|| n.as_f64().and_then(|y| parse_year(&y.to_string()))),
        JsonValue::String(s) => parse_year(s),
        _ => None,
    }
}

fn json_value(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_value(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the CSV layout.
///
/// Indicator columns may be any type Arrow can cast to `Float64`; cells that
/// fail the cast read as missing. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let header_map = {
        let schema = builder.schema();
        HeaderMap::resolve(schema.fields().iter().map(|f| f.name().as_str()))?
    };
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();
    let mut dropped = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let countries =
            cast_column(batch.column(header_map.country), COUNTRY_COLUMN, &DataType::Utf8)?;
        let countries = countries.as_string::<i32>();
        let years = cast_column(batch.column(header_map.year), YEAR_COLUMN, &DataType::Int64)?;
        let years = years.as_primitive::<Int64Type>();

        let mut values = Vec::with_capacity(header_map.indicators.len());
        for &(ind, idx) in &header_map.indicators {
            let col = cast_column(batch.column(idx), ind.name(), &DataType::Float64)?;
            values.push((ind, col));
        }

        for row in 0..batch.num_rows() {
            let country = if countries.is_null(row) {
                ""
            } else {
                countries.value(row).trim()
            };
            let year = if years.is_null(row) {
                None
            } else {
                i32::try_from(years.value(row)).ok()
            };
            let Some(year) = year.filter(|_| !country.is_empty()) else {
                dropped += 1;
                continue;
            };

            let mut obs = Observation::new(country, year);
            for (ind, col) in &values {
                let col = col.as_primitive::<Float64Type>();
                let value = if col.is_null(row) {
                    None
                } else {
                    Some(col.value(row)).filter(|v| !v.is_nan())
                };
                obs.set(*ind, value);
            }
            observations.push(obs);
        }
    }

    log_dropped(dropped);
    Ok(Dataset::new(observations, header_map.schema()))
}

fn cast_column(col: &ArrayRef, name: &str, to: &DataType) -> Result<ArrayRef> {
    cast(col, to).map_err(|_| {
        SchemaError::UnsupportedType {
            column: name.to_string(),
            found: col.data_type().to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_headers_are_trimmed_and_cells_parsed() {
        let file = write_temp(
            ".csv",
            "country_name , year,  GDP (Current USD) ,Inflation (CPI %),country_id\n\
             Chile,2020,100,2.5,CHL\n\
             Peru,2020,,abc,PER\n",
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert!(ds.schema.contains(Indicator::Gdp));
        assert!(ds.schema.contains(Indicator::InflationCpi));
        assert!(!ds.schema.contains(Indicator::PublicDebt));

        let chile = &ds.observations[0];
        assert_eq!(chile.country, "Chile");
        assert_eq!(chile.year, 2020);
        assert_eq!(chile.get(Indicator::Gdp), Some(100.0));
        assert_eq!(chile.get(Indicator::InflationCpi), Some(2.5));

        let peru = &ds.observations[1];
        assert_eq!(peru.get(Indicator::Gdp), None);
        assert_eq!(peru.get(Indicator::InflationCpi), None);
    }

    #[test]
    fn csv_rows_without_country_or_year_are_dropped() {
        let file = write_temp(
            ".csv",
            "country_name,year,GDP (Current USD)\n\
             Chile,2020.0,1\n\
             ,2020,2\n\
             Peru,,3\n\
             Peru,next,4\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.observations[0].year, 2020);
    }

    #[test]
    fn csv_missing_year_column_is_a_schema_error() {
        let file = write_temp(".csv", "country_name,GDP (Current USD)\nChile,1\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingColumn(YEAR_COLUMN))
        );
    }

    #[test]
    fn json_records_load() {
        let file = write_temp(
            ".json",
            r#"[
                {"country_name": "Chile", "year": 2021, "Public Debt (% of GDP)": 36.3},
                {"country_name": "Peru", "year": 2021, "Public Debt (% of GDP)": null},
                {"country_name": null, "year": 2021}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.schema.indicators(), vec![Indicator::PublicDebt]);
        assert_eq!(ds.observations[0].get(Indicator::PublicDebt), Some(36.3));
        assert_eq!(ds.observations[1].get(Indicator::PublicDebt), None);
    }

    #[test]
    fn parquet_columns_are_cast_to_f64() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("country_name", DataType::Utf8, true),
            Field::new("year", DataType::Int64, true),
            Field::new("GDP (Current USD)", DataType::Float64, true),
            Field::new("Unemployment Rate (%)", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Chile"), Some("Peru"), None])),
                Arc::new(Int64Array::from(vec![Some(2020), Some(2020), Some(2020)])),
                Arc::new(Float64Array::from(vec![Some(1.5), None, Some(3.0)])),
                Arc::new(Int64Array::from(vec![Some(7), Some(8), Some(9)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.observations[0].get(Indicator::Gdp), Some(1.5));
        assert_eq!(ds.observations[1].get(Indicator::Gdp), None);
        assert_eq!(ds.observations[1].get(Indicator::UnemploymentRate), Some(8.0));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }
}
