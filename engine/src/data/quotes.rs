// Daily quote / fundamentals sheet: one typed row per trading code.
use super::sheet::CellValue;
use crate::error::EngineError;
use csv::ReaderBuilder;
use shared::models::{QuoteField, QuoteRecord};
use std::collections::{HashMap, HashSet};
use std::io::Read;

pub const CODE_HEADER: &str = "Trading Code";

/// Reconciles the stored quote sheet with a fresh scrape.
///
/// Rows follow the fresh scrape's order; codes only present in `existing` are kept
/// after them. For a code present in both, each field takes the fresh value when it is
/// non-empty and the existing value otherwise, so a daily price refresh leaves the
/// fundamentals columns intact.
pub fn merge_quotes(existing: &[QuoteRecord], fresh: &[QuoteRecord]) -> Vec<QuoteRecord> {
    let old_by_code: HashMap<&str, &QuoteRecord> =
        existing.iter().map(|r| (r.trading_code.as_str(), r)).collect();
    let mut emitted = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len().max(fresh.len()));

    for record in fresh {
        if !emitted.insert(record.trading_code.as_str()) {
            continue;
        }
        let mut row = record.clone();
        if let Some(old) = old_by_code.get(record.trading_code.as_str()) {
            for field in QuoteField::ALL {
                if row.get(field).is_none() {
                    row.set(field, old.get(field).map(str::to_string));
                }
            }
        }
        merged.push(row);
    }

    for record in existing {
        if emitted.insert(record.trading_code.as_str()) {
            merged.push(record.clone());
        }
    }
    merged
}

pub fn quote_headers() -> Vec<&'static str> {
    let mut headers = vec![QuoteField::Date.header(), CODE_HEADER];
    headers.extend(QuoteField::ALL.iter().skip(1).map(|f| f.header()));
    headers
}

/// Sheet layout: Date, Trading Code, then the remaining quote columns.
pub fn quote_grid(records: &[QuoteRecord]) -> Vec<Vec<CellValue>> {
    let mut grid = Vec::with_capacity(records.len() + 1);
    grid.push(quote_headers().into_iter().map(CellValue::text).collect());
    for record in records {
        let mut row = vec![
            cell(record.get(QuoteField::Date)),
            CellValue::text(record.trading_code.clone()),
        ];
        row.extend(QuoteField::ALL.iter().skip(1).map(|f| cell(record.get(*f))));
        grid.push(row);
    }
    grid
}

fn cell(value: Option<&str>) -> CellValue {
    value.map_or(CellValue::Empty, CellValue::text)
}

/// Reads quote rows by header name; unknown columns are ignored, rows without a trading
/// code are skipped.
pub fn read_quotes<R: Read>(reader: R) -> Result<Vec<QuoteRecord>, EngineError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let code_pos = headers
        .iter()
        .position(|h| h.trim() == CODE_HEADER)
        .ok_or_else(|| EngineError::SheetFormatError(format!("Missing '{}' column", CODE_HEADER)))?;
    let field_pos: Vec<(QuoteField, usize)> = QuoteField::ALL
        .iter()
        .filter_map(|f| headers.iter().position(|h| h.trim() == f.header()).map(|pos| (*f, pos)))
        .collect();

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let code = record.get(code_pos).unwrap_or_default();
        let Ok(mut quote) = QuoteRecord::new(code) else {
            tracing::debug!(line = idx + 2, "Skipping quote row without trading code");
            continue;
        };
        for (field, pos) in &field_pos {
            quote.set(*field, record.get(*pos).map(str::to_string));
        }
        records.push(quote);
    }
    Ok(records)
}
