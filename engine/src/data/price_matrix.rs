// In-memory price table keyed by (date, instrument code)
use chrono::NaiveDate;
use std::collections::HashMap;

/// Date × instrument table of optional prices.
///
/// The date axis is kept strictly ascending and every column has exactly one cell per
/// axis date. Instruments keep their insertion order, which is the sheet column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl PriceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut matrix = Self::new();
        matrix.extend_dates(dates);
        matrix
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.instruments.is_empty()
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Appends a column of missing cells. Returns false if the code already exists.
    pub fn add_instrument(&mut self, code: &str) -> bool {
        if self.columns.contains_key(code) {
            return false;
        }
        self.instruments.push(code.to_string());
        self.columns.insert(code.to_string(), vec![None; self.dates.len()]);
        true
    }

    /// Inserts `date` at its chronological position. Returns the row index and whether
    /// the row is new.
    pub fn add_date(&mut self, date: NaiveDate) -> (usize, bool) {
        match self.dates.binary_search(&date) {
            Ok(idx) => (idx, false),
            Err(idx) => {
                self.dates.insert(idx, date);
                for column in self.columns.values_mut() {
                    column.insert(idx, None);
                }
                (idx, true)
            }
        }
    }

    pub fn extend_dates(&mut self, dates: impl IntoIterator<Item = NaiveDate>) -> usize {
        dates.into_iter().filter(|d| self.add_date(*d).1).count()
    }

    pub fn get(&self, date: NaiveDate, code: &str) -> Option<f64> {
        let idx = self.date_index(date)?;
        self.columns.get(code).and_then(|column| column[idx])
    }

    /// Writes a cell, growing the axis and the column set as needed.
    /// Returns the previous value of the cell.
    pub fn set(&mut self, date: NaiveDate, code: &str, value: Option<f64>) -> Option<f64> {
        self.add_instrument(code);
        let (idx, _) = self.add_date(date);
        match self.columns.get_mut(code) {
            Some(column) => std::mem::replace(&mut column[idx], value),
            None => None,
        }
    }

    pub fn column(&self, code: &str) -> Option<&[Option<f64>]> {
        self.columns.get(code).map(|c| c.as_slice())
    }

    /// Values of one axis row, in instrument order.
    pub fn row(&self, idx: usize) -> Vec<Option<f64>> {
        self.instruments
            .iter()
            .map(|code| self.columns.get(code).and_then(|c| c.get(idx).copied().flatten()))
            .collect()
    }

    /// Builds a table on the same axis and columns where each column is `f` applied to
    /// the corresponding price column.
    pub fn map_columns<F>(&self, mut f: F) -> PriceMatrix
    where
        F: FnMut(&[Option<f64>]) -> Vec<f64>,
    {
        let mut columns = HashMap::with_capacity(self.columns.len());
        for code in &self.instruments {
            let source = self.columns.get(code).map(|c| c.as_slice()).unwrap_or(&[]);
            let mut mapped: Vec<Option<f64>> = f(source).into_iter().map(Some).collect();
            mapped.resize(self.dates.len(), None);
            columns.insert(code.clone(), mapped);
        }
        PriceMatrix {
            dates: self.dates.clone(),
            instruments: self.instruments.clone(),
            columns,
        }
    }

    pub fn present_cells(&self) -> usize {
        self.columns
            .values()
            .map(|c| c.iter().filter(|v| v.is_some()).count())
            .sum()
    }
}
