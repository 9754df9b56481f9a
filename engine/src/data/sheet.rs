// Spreadsheet layout of a price or RSI table:
//   Date,AAA,BBB
//   01/01/2024,10,
// First row is the header, first column the "dd/mm/yyyy" date, one numeric (or empty)
// cell per instrument in header order.
use super::price_matrix::PriceMatrix;
use crate::error::EngineError;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use shared::utils::sheet_format;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub const DATE_HEADER: &str = "Date";

/// One cell of the array-of-arrays handed to a report sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn from_price(value: Option<f64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Number)
    }

    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    fn as_price(&self) -> Result<Option<f64>, EngineError> {
        match self {
            CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
            CellValue::Number(_) | CellValue::Empty => Ok(None),
            CellValue::Text(s) if s.trim().is_empty() => Ok(None),
            CellValue::Text(s) => Ok(Some(sheet_format::parse_price(s)?)),
        }
    }
}

/// A dated row of a sheet, one value per header instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    instruments: Vec<String>,
    rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Validates the header (non-empty, unique codes) and that no row is wider than it.
    /// Short rows are padded with missing cells.
    pub fn new(instruments: Vec<String>, rows: Vec<SheetRow>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for code in &instruments {
            if code.trim().is_empty() {
                return Err(EngineError::SheetFormatError("Empty instrument code in header".to_string()));
            }
            if !seen.insert(code.as_str()) {
                return Err(EngineError::SheetFormatError(format!("Duplicate instrument '{}' in header", code)));
            }
        }

        let mut rows = rows;
        for row in rows.iter_mut() {
            if row.values.len() > instruments.len() {
                return Err(EngineError::SheetFormatError(format!(
                    "Row {} has {} values for {} instruments",
                    sheet_format::format_sheet_date(row.date),
                    row.values.len(),
                    instruments.len()
                )));
            }
            row.values.resize(instruments.len(), None);
        }
        Ok(Self { instruments, rows })
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn from_matrix(matrix: &PriceMatrix) -> Self {
        let rows = matrix
            .dates()
            .iter()
            .enumerate()
            .map(|(idx, date)| SheetRow { date: *date, values: matrix.row(idx) })
            .collect();
        Self {
            instruments: matrix.instruments().to_vec(),
            rows,
        }
    }

    // Rows are re-sorted by date; a repeated date only overrides where it holds a value.
    pub fn into_matrix(self) -> PriceMatrix {
        let mut matrix = PriceMatrix::with_dates(self.rows.iter().map(|r| r.date));
        for code in &self.instruments {
            matrix.add_instrument(code);
        }
        for row in self.rows {
            for (code, value) in self.instruments.iter().zip(row.values) {
                if value.is_some() {
                    matrix.set(row.date, code, value);
                }
            }
        }
        matrix
    }

    pub fn header(&self) -> Vec<CellValue> {
        std::iter::once(CellValue::text(DATE_HEADER))
            .chain(self.instruments.iter().map(|c| CellValue::text(c.clone())))
            .collect()
    }

    pub fn to_grid(&self) -> Vec<Vec<CellValue>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.header());
        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.values.len() + 1);
            cells.push(CellValue::text(sheet_format::format_sheet_date(row.date)));
            cells.extend(row.values.iter().map(|v| CellValue::from_price(*v)));
            grid.push(cells);
        }
        grid
    }

    pub fn from_grid(grid: &[Vec<CellValue>]) -> Result<Self, EngineError> {
        let (header, body) = grid
            .split_first()
            .ok_or_else(|| EngineError::SheetFormatError("Sheet has no header row".to_string()))?;
        let instruments = parse_header(header.iter().map(CellValue::to_field))?;

        let mut rows = Vec::with_capacity(body.len());
        for (idx, cells) in body.iter().enumerate() {
            let line = idx + 2;
            let Some((date_cell, value_cells)) = cells.split_first() else { continue };
            let date = parse_row_date(&date_cell.to_field(), line)?;
            let values = value_cells
                .iter()
                .map(|cell| cell.as_price())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| EngineError::SheetFormatError(format!("Row {}: {}", line, e)))?;
            rows.push(SheetRow { date, values: trim_trailing_empty(values, instruments.len()) });
        }
        Self::new(instruments, rows)
    }

    pub fn read_csv(path: &Path) -> Result<Self, EngineError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // Spreadsheet exports drop trailing empty cells
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let instruments = parse_header(headers.iter().map(str::to_string))?;

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;
            rows.push(Self::parse_record(&record, line, instruments.len())?);
        }
        Self::new(instruments, rows)
    }

    fn parse_record(record: &StringRecord, line: usize, width: usize) -> Result<SheetRow, EngineError> {
        let date_str = record
            .get(0)
            .ok_or_else(|| EngineError::SheetFormatError(format!("Missing date at line {}", line)))?;
        let date = parse_row_date(date_str, line)?;

        let mut values = Vec::with_capacity(record.len().saturating_sub(1));
        for (col, field) in record.iter().enumerate().skip(1) {
            if field.trim().is_empty() {
                values.push(None);
                continue;
            }
            let price = sheet_format::parse_price(field).map_err(|e| {
                EngineError::SheetFormatError(format!("Error parsing column {} at line {}: {}", col + 1, line, e))
            })?;
            values.push(Some(price));
        }
        Ok(SheetRow { date, values: trim_trailing_empty(values, width) })
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), EngineError> {
        write_grid_csv(path, &self.to_grid())
    }
}

fn parse_header(mut fields: impl Iterator<Item = String>) -> Result<Vec<String>, EngineError> {
    match fields.next() {
        Some(first) if first.trim() == DATE_HEADER => {}
        other => {
            return Err(EngineError::SheetFormatError(format!(
                "Expected '{}' as first header, found {:?}",
                DATE_HEADER, other
            )))
        }
    }
    Ok(fields.map(|f| f.trim().to_string()).collect())
}

fn parse_row_date(s: &str, line: usize) -> Result<NaiveDate, EngineError> {
    sheet_format::parse_sheet_date(s)
        .map_err(|e| EngineError::SheetFormatError(format!("Error parsing date at line {}: {}", line, e)))
}

// Extra cells past the header are tolerated only when empty.
fn trim_trailing_empty(mut values: Vec<Option<f64>>, width: usize) -> Vec<Option<f64>> {
    while values.len() > width && values.last() == Some(&None) {
        values.pop();
    }
    values
}

pub fn write_grid_csv(path: &Path, grid: &[Vec<CellValue>]) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = WriterBuilder::new().flexible(true).from_path(path)?;
    for row in grid {
        wtr.write_record(row.iter().map(CellValue::to_field))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Loads the table persisted by the previous run. An absent or malformed file means
/// "no prior data": a warning is logged and an empty table returned.
pub fn load_previous(path: &Path) -> PriceMatrix {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No previous table found, creating new");
        return PriceMatrix::new();
    }
    match SheetTable::read_csv(path) {
        Ok(table) => {
            tracing::info!(
                path = %path.display(),
                rows = table.rows().len(),
                instruments = table.instruments().len(),
                "Loaded previous table"
            );
            table.into_matrix()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Previous table unreadable, starting fresh");
            PriceMatrix::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::merge::merge;
    use shared::models::{PricePoint, ScrapedSeries};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn test_grid_end_to_end_merge() {
        let old_grid = vec![
            vec![text("Date"), text("AAA")],
            vec![text("01/01/2024"), CellValue::Number(10.0)],
            vec![text("02/01/2024"), CellValue::Number(11.0)],
        ];
        let old = SheetTable::from_grid(&old_grid).unwrap().into_matrix();
        let scrape = vec![ScrapedSeries::new(
            "AAA",
            vec![PricePoint::new(ymd(2024, 1, 2), 12.0), PricePoint::new(ymd(2024, 1, 3), 13.0)],
        )];
        let merged = merge(&old, &scrape, &["AAA".to_string()]);
        let grid = SheetTable::from_matrix(&merged).to_grid();
        assert_eq!(
            grid,
            vec![
                vec![text("Date"), text("AAA")],
                vec![text("01/01/2024"), CellValue::Number(10.0)],
                vec![text("02/01/2024"), CellValue::Number(12.0)],
                vec![text("03/01/2024"), CellValue::Number(13.0)],
            ]
        );
    }

    #[test]
    fn test_grid_serializes_as_plain_arrays() {
        let grid = vec![
            vec![text("Date"), text("AAA")],
            vec![text("01/01/2024"), CellValue::Empty],
            vec![text("02/01/2024"), CellValue::Number(12.5)],
        ];
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"[["Date","AAA"],["01/01/2024",null],["02/01/2024",12.5]]"#);
    }

    #[test]
    fn test_read_csv_with_short_rows_and_blanks() {
        let tmp = create_test_csv("Date,AAA,BBB\n01/01/2024,10,\n02/01/2024,\"1,011.5\"\n03/01/2024");
        let table = SheetTable::read_csv(tmp.path()).unwrap();
        assert_eq!(table.instruments(), &["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(table.rows()[0].values, vec![Some(10.0), None]);
        assert_eq!(table.rows()[1].values, vec![Some(1011.5), None]);
        assert_eq!(table.rows()[2].values, vec![None, None]);
    }

    #[test]
    fn test_write_then_read_csv() {
        let mut m = PriceMatrix::new();
        m.set(ymd(2024, 1, 1), "AAA", Some(10.0));
        m.set(ymd(2024, 1, 2), "BBB", Some(66.67));
        let tmp = NamedTempFile::new().unwrap();
        SheetTable::from_matrix(&m).write_csv(tmp.path()).unwrap();

        let content = std::fs::read_to_string(tmp.path()).unwrap();
        assert_eq!(content, "Date,AAA,BBB\n01/01/2024,10,\n02/01/2024,,66.67\n");
        assert_eq!(SheetTable::read_csv(tmp.path()).unwrap().into_matrix(), m);
    }

    #[test]
    fn test_read_csv_bad_header() {
        let tmp = create_test_csv("Day,AAA\n01/01/2024,10");
        let err = SheetTable::read_csv(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Expected 'Date'"));
    }

    #[test]
    fn test_read_csv_bad_price() {
        let tmp = create_test_csv("Date,AAA\n01/01/2024,ten");
        let err = SheetTable::read_csv(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_csv_row_wider_than_header() {
        let tmp = create_test_csv("Date,AAA\n01/01/2024,10,11");
        assert!(SheetTable::read_csv(tmp.path()).is_err());
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = SheetTable::new(vec!["AAA".into(), "AAA".into()], Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Duplicate instrument"));
    }

    #[test]
    fn test_load_previous_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_previous(&dir.path().join("absent.csv")).is_empty());
    }

    #[test]
    fn test_load_previous_malformed_file_is_empty() {
        let tmp = create_test_csv("this is not,a price table\nat,all");
        assert!(load_previous(tmp.path()).is_empty());
    }

    #[test]
    fn test_into_matrix_sorts_rows() {
        let tmp = create_test_csv("Date,AAA\n03/01/2024,3\n01/01/2024,1");
        let m = SheetTable::read_csv(tmp.path()).unwrap().into_matrix();
        assert_eq!(m.dates(), &[ymd(2024, 1, 1), ymd(2024, 1, 3)]);
        assert_eq!(m.column("AAA").unwrap(), &[Some(1.0), Some(3.0)]);
    }
}
