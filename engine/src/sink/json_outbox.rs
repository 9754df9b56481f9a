// Stages spreadsheet value-update requests as JSON files. Delivering them to the
// remote spreadsheet service (auth, transport) is handled outside this crate.
use super::{tab_file_stem, ReportSink};
use crate::data::sheet::CellValue;
use crate::error::EngineError;
use serde::Serialize;
use shared::utils::sheet_format::column_letter;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct SheetUpdateRequest<'a> {
    pub spreadsheet_id: &'a str,
    pub tab: &'a str,
    pub range: String,
    pub value_input_option: &'static str,
    pub values: &'a [Vec<CellValue>],
}

/// `'<tab>'!A1:<last column><row count>`, sized by the header row.
pub fn update_range(tab: &str, grid: &[Vec<CellValue>]) -> String {
    let columns = grid.first().map_or(0, |header| header.len()).max(1);
    format!("'{}'!A1:{}{}", tab, column_letter(columns - 1), grid.len().max(1))
}

pub struct JsonOutboxSink {
    out_dir: PathBuf,
    spreadsheet_id: String,
}

impl JsonOutboxSink {
    pub fn new(out_dir: &Path, spreadsheet_id: String) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            spreadsheet_id,
        }
    }

    pub fn path_for(&self, tab: &str) -> PathBuf {
        self.out_dir.join(format!("{}.json", tab_file_stem(tab)))
    }
}

impl ReportSink for JsonOutboxSink {
    fn publish(&self, tab: &str, grid: &[Vec<CellValue>]) -> Result<(), EngineError> {
        if grid.is_empty() {
            tracing::warn!(tab, "Nothing to publish, skipping empty tab");
            return Ok(());
        }
        let request = SheetUpdateRequest {
            spreadsheet_id: &self.spreadsheet_id,
            tab,
            range: update_range(tab, grid),
            value_input_option: "USER_ENTERED",
            values: grid,
        };
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.path_for(tab);
        let body = serde_json::to_vec_pretty(&request)?;
        std::fs::write(&path, body)?;
        tracing::info!(tab, range = %request.range, path = %path.display(), "Staged sheet update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(columns: usize, rows: usize) -> Vec<Vec<CellValue>> {
        vec![vec![CellValue::Empty; columns]; rows]
    }

    #[test]
    fn test_update_range() {
        assert_eq!(update_range("Price 1Y", &grid(2, 4)), "'Price 1Y'!A1:B4");
        assert_eq!(update_range("RSI 1M", &grid(27, 361)), "'RSI 1M'!A1:AA361");
    }

    #[test]
    fn test_publish_stages_request() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonOutboxSink::new(dir.path(), "sheet-123".to_string());
        let grid = vec![
            vec![CellValue::text("Date"), CellValue::text("AAA")],
            vec![CellValue::text("01/01/2024"), CellValue::Empty],
        ];
        sink.publish("Price 1Y", &grid).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("Price_1Y.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["spreadsheet_id"], "sheet-123");
        assert_eq!(json["range"], "'Price 1Y'!A1:B2");
        assert_eq!(json["value_input_option"], "USER_ENTERED");
        assert_eq!(json["values"][1][0], "01/01/2024");
        assert!(json["values"][1][1].is_null());
    }

    #[test]
    fn test_publish_empty_grid_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonOutboxSink::new(dir.path(), "sheet-123".to_string());
        sink.publish("Empty", &[]).unwrap();
        assert!(!dir.path().join("Empty.json").exists());
    }
}
