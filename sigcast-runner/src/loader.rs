//! CSV loading for bar and forecast series.
//!
//! The bar file is expected to carry precomputed indicator columns; a
//! missing required column is a configuration error and fails before any
//! row is parsed. Per-row indicator gaps are legal: an empty cell loads as
//! NaN (bars) or an explicit gap (forecasts), and the engine handles them
//! bar-by-bar.

use chrono::NaiveDate;
use sigcast_core::{Bar, IndicatorSet, SeriesForecast};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Columns the bar CSV must provide.
pub const REQUIRED_BAR_COLUMNS: [&str; 12] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "sma_20",
    "sma_50",
    "rsi_14",
    "macd",
    "macd_signal",
    "atr_14",
];

/// Indicator columns loaded when present, NaN otherwise.
pub const OPTIONAL_BAR_COLUMNS: [&str; 4] = ["adx_14", "plus_di", "minus_di", "psar"];

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' missing from header")]
    MissingColumn { column: String },

    #[error("row {row}: bad value '{value}' in column '{column}'")]
    BadField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: bad date '{value}' (expected YYYY-MM-DD)")]
    BadDate { row: usize, value: String },
}

struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, required: &[&str]) -> Result<Self, LoadError> {
        let indices: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        for column in required {
            if !indices.contains_key(*column) {
                return Err(LoadError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(Self { indices })
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.indices
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
    }

    fn required_f64(
        &self,
        record: &csv::StringRecord,
        row: usize,
        column: &str,
    ) -> Result<f64, LoadError> {
        let raw = self.get(record, column).unwrap_or("");
        raw.parse::<f64>().map_err(|_| LoadError::BadField {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }

    /// Indicator cell: empty means "not yet available" and loads as NaN.
    fn indicator_f64(
        &self,
        record: &csv::StringRecord,
        row: usize,
        column: &str,
    ) -> Result<f64, LoadError> {
        match self.get(record, column) {
            None | Some("") => Ok(f64::NAN),
            Some(raw) => raw.parse::<f64>().map_err(|_| LoadError::BadField {
                row,
                column: column.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

/// Load a bar series, assigning contiguous indices in file order.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers, &REQUIRED_BAR_COLUMNS)?;

    let mut bars = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 2; // 1-based, after the header line

        let date_raw = columns.get(&record, "date").unwrap_or("");
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").map_err(|_| {
            LoadError::BadDate {
                row,
                value: date_raw.to_string(),
            }
        })?;

        let volume_raw = columns.get(&record, "volume").unwrap_or("");
        let volume = volume_raw.parse::<u64>().map_err(|_| LoadError::BadField {
            row,
            column: "volume".to_string(),
            value: volume_raw.to_string(),
        })?;

        let mut indicators = IndicatorSet::empty();
        indicators.sma_20 = columns.indicator_f64(&record, row, "sma_20")?;
        indicators.sma_50 = columns.indicator_f64(&record, row, "sma_50")?;
        indicators.rsi_14 = columns.indicator_f64(&record, row, "rsi_14")?;
        indicators.macd = columns.indicator_f64(&record, row, "macd")?;
        indicators.macd_signal = columns.indicator_f64(&record, row, "macd_signal")?;
        indicators.atr_14 = columns.indicator_f64(&record, row, "atr_14")?;
        indicators.adx_14 = columns.indicator_f64(&record, row, "adx_14")?;
        indicators.plus_di = columns.indicator_f64(&record, row, "plus_di")?;
        indicators.minus_di = columns.indicator_f64(&record, row, "minus_di")?;
        indicators.psar = columns.indicator_f64(&record, row, "psar")?;

        bars.push(Bar {
            index,
            date,
            open: columns.required_f64(&record, row, "open")?,
            high: columns.required_f64(&record, row, "high")?,
            low: columns.required_f64(&record, row, "low")?,
            close: columns.required_f64(&record, row, "close")?,
            volume,
            indicators,
        });
    }

    Ok(bars)
}

/// Load a per-bar forecast series aligned to the bar file.
///
/// Expects a `predicted` column; an empty cell is an explicit gap, never
/// coerced to zero.
pub fn load_forecast(path: &Path) -> Result<SeriesForecast, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers, &["predicted"])?;

    let mut values = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 2;
        let value = match columns.get(&record, "predicted") {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| LoadError::BadField {
                row,
                column: "predicted".to_string(),
                value: raw.to_string(),
            })?),
        };
        values.push(value);
    }

    Ok(SeriesForecast::new(values))
}
