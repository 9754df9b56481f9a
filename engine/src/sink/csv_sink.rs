use super::{tab_file_stem, ReportSink};
use crate::data::sheet::{write_grid_csv, CellValue};
use crate::error::EngineError;
use std::path::{Path, PathBuf};

/// Writes each tab to `<out_dir>/<tab>.csv`, replacing the previous contents.
pub struct CsvFileSink {
    out_dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(out_dir: &Path) -> Self {
        Self { out_dir: out_dir.to_path_buf() }
    }

    pub fn path_for(&self, tab: &str) -> PathBuf {
        self.out_dir.join(format!("{}.csv", tab_file_stem(tab)))
    }
}

impl ReportSink for CsvFileSink {
    fn publish(&self, tab: &str, grid: &[Vec<CellValue>]) -> Result<(), EngineError> {
        let path = self.path_for(tab);
        write_grid_csv(&path, grid)?;
        tracing::info!(tab, path = %path.display(), rows = grid.len(), "Published tab");
        Ok(())
    }
}
