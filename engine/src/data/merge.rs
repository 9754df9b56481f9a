// Reconciliation of a previously persisted price table with a fresh scrape.
// Pure data transformation: no I/O, fully testable.
use super::price_matrix::PriceMatrix;
use chrono::NaiveDate;
use shared::models::ScrapedSeries;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Dates that must exist as rows even when no instrument has a price for them.
    pub axis: Vec<NaiveDate>,
    /// Scraped points dated before this are ignored; the old table's cells stand.
    pub accept_since: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub new_instruments: usize,
    pub new_dates: usize,
    pub cells_filled: usize,
    pub cells_overwritten: usize,
    pub cells_unchanged: usize,
    pub points_ignored: usize,
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    pub table: PriceMatrix,
    pub stats: MergeStats,
}

/// Merges `scraped` into `old` with default options.
///
/// Columns are the old columns followed by any new codes from `instruments` and the
/// scrape, in first-seen order. A scraped value replaces the old cell; a cell with no
/// scraped value keeps whatever the old table had.
pub fn merge(old: &PriceMatrix, scraped: &[ScrapedSeries], instruments: &[String]) -> PriceMatrix {
    merge_with(old, scraped, instruments, &MergeOptions::default()).table
}

pub fn merge_with(
    old: &PriceMatrix,
    scraped: &[ScrapedSeries],
    instruments: &[String],
    options: &MergeOptions,
) -> MergeResult {
    let mut table = old.clone();
    let mut stats = MergeStats::default();

    let codes = instruments
        .iter()
        .map(|code| code.trim())
        .chain(scraped.iter().map(|s| s.instrument.trim()));
    for code in codes {
        if !code.is_empty() && table.add_instrument(code) {
            stats.new_instruments += 1;
        }
    }

    stats.new_dates += table.extend_dates(options.axis.iter().copied());

    for series in scraped {
        let code = series.instrument.trim();
        if code.is_empty() {
            // A blank header cell would make the persisted table unreadable.
            stats.points_ignored += series.points.len();
            continue;
        }
        for point in &series.points {
            let accepted = options.accept_since.map_or(true, |since| point.date >= since);
            if !accepted || !point.price.is_finite() {
                stats.points_ignored += 1;
                continue;
            }
            if table.add_date(point.date).1 {
                stats.new_dates += 1;
            }
            match table.set(point.date, code, Some(point.price)) {
                None => stats.cells_filled += 1,
                Some(previous) if previous == point.price => stats.cells_unchanged += 1,
                Some(_) => stats.cells_overwritten += 1,
            }
        }
    }

    MergeResult { table, stats }
}

/// Order-preserving, de-duplicated union of several instrument code lists.
pub fn union_instruments<S: AsRef<str>>(lists: &[Vec<S>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut union = Vec::new();
    for code in lists.iter().flatten() {
        let code = code.as_ref().trim();
        if !code.is_empty() && seen.insert(code.to_string()) {
            union.push(code.to_string());
        }
    }
    union
}

/// Combines several tables into one with lexicographically sorted columns.
///
/// The axis is the chronological union of every table's dates; later tables override
/// earlier ones only where they hold a value.
pub fn combine_sorted(tables: &[PriceMatrix]) -> PriceMatrix {
    let mut codes: Vec<&String> = tables.iter().flat_map(|t| t.instruments()).collect();
    codes.sort();
    codes.dedup();

    let mut combined = PriceMatrix::new();
    for code in codes {
        combined.add_instrument(code);
    }
    for table in tables {
        combined.extend_dates(table.dates().iter().copied());
        for code in table.instruments() {
            let Some(column) = table.column(code) else { continue };
            for (date, value) in table.dates().iter().zip(column) {
                if value.is_some() {
                    combined.set(*date, code, *value);
                }
            }
        }
    }
    combined
}
