// Reporting sinks: where finished tables go after a run.
pub mod csv_sink;
pub mod json_outbox;

pub use csv_sink::CsvFileSink;
pub use json_outbox::JsonOutboxSink;

use crate::config::settings::{SinkKind, SinkSettings};
use crate::data::sheet::CellValue;
use crate::error::EngineError;

pub trait ReportSink: Send + Sync {
    /// Persists one tab. `grid` is header row first, one row per record after it.
    fn publish(&self, tab: &str, grid: &[Vec<CellValue>]) -> Result<(), EngineError>;
}

pub fn build_sink(settings: &SinkSettings) -> Result<Box<dyn ReportSink>, EngineError> {
    match settings.kind {
        SinkKind::Csv => Ok(Box::new(CsvFileSink::new(&settings.out_dir))),
        SinkKind::JsonOutbox => {
            let spreadsheet_id = settings.spreadsheet_id.clone().ok_or_else(|| {
                EngineError::ConfigError("sink.spreadsheet_id is required for the json_outbox sink".to_string())
            })?;
            Ok(Box::new(JsonOutboxSink::new(&settings.out_dir, spreadsheet_id)))
        }
    }
}

// "Price 1Y" -> "Price_1Y"
pub(crate) fn tab_file_stem(tab: &str) -> String {
    tab.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
