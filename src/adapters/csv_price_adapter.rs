//! CSV file of historical daily changes.
//!
//! One change per record, read from a configurable column. Values are decimal
//! fractions (`0.0123` is +1.23%) unless suffixed with `%`, in which case they
//! are already percentages. Stray whitespace, control and non-ASCII characters
//! (e.g. a BOM or non-breaking spaces from a spreadsheet export) are stripped.

use crate::domain::error::LevsimError;
use crate::domain::price::Price;
use crate::ports::price_source_port::PriceSourcePort;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
    column: usize,
    has_headers: bool,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            column: 0,
            has_headers: false,
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn parse(&self, content: &str) -> Result<Vec<Price>, LevsimError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut prices = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LevsimError::PriceParse {
                line: e.position().map(|p| p.line() as usize).unwrap_or(0),
                value: String::new(),
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

            let raw = record.get(self.column).ok_or_else(|| LevsimError::PriceParse {
                line,
                value: String::new(),
                reason: format!("missing column {}", self.column),
            })?;

            prices.push(parse_change(raw).map_err(|reason| LevsimError::PriceParse {
                line,
                value: raw.to_string(),
                reason,
            })?);
        }

        Ok(prices)
    }
}

impl PriceSourcePort for CsvPriceAdapter {
    fn load_daily_changes(&self) -> Result<Vec<Price>, LevsimError> {
        let content = fs::read_to_string(&self.path)?;
        let prices = self.parse(&content)?;
        tracing::info!(
            path = %self.path.display(),
            count = prices.len(),
            "loaded daily price changes"
        );
        Ok(prices)
    }
}

fn parse_change(raw: &str) -> Result<Price, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let (number, is_percent) = match cleaned.strip_suffix('%') {
        Some(n) => (n, true),
        None => (cleaned.as_str(), false),
    };

    let value: f64 = number.parse().map_err(|e| format!("{}", e))?;
    if !value.is_finite() {
        return Err("value is not finite".to_string());
    }

    Ok(if is_percent {
        Price::new(value)
    } else {
        Price::from_decimal(value)
    })
}
