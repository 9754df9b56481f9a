// Handler for the quote refresh job: per category, stored quote sheet + fresh quotes
use super::RunSummary;
use crate::config::settings::EngineSettings;
use crate::data::quotes::{merge_quotes, quote_grid, read_quotes};
use crate::data::sheet::write_grid_csv;
use crate::error::EngineError;
use crate::sink::ReportSink;
use crate::sources::MarketSource;
use shared::models::QuoteRecord;
use std::path::Path;
use uuid::Uuid;

pub async fn handle_refresh_quotes<S: MarketSource>(
    run_id: Uuid,
    settings: &EngineSettings,
    source: &S,
    sink: &dyn ReportSink,
) -> Result<RunSummary, EngineError> {
    let mut summary = RunSummary::new(run_id, "quotes");
    summary.requested = settings.categories.len();

    for category in &settings.categories {
        let fresh = match source.quotes(category).await {
            Ok(fresh) if fresh.is_empty() => {
                tracing::warn!(category = %category, "No quote rows parsed, keeping stored sheet");
                summary.failed.push(category.clone());
                continue;
            }
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::error!(category = %category, error = %e, "Failed to fetch quotes");
                summary.failed.push(category.clone());
                continue;
            }
        };

        let path = settings.quotes_dir.join(format!("quotes_{}.csv", category));
        let existing = load_stored_quotes(&path);
        let merged = merge_quotes(&existing, &fresh);
        let grid = quote_grid(&merged);

        write_grid_csv(&path, &grid)?;
        sink.publish(&format!("Category {}", category), &grid)?;
        tracing::info!(category = %category, records = merged.len(), fresh = fresh.len(), "Updated quote sheet");

        summary.fetched += 1;
        summary.rows += merged.len();
        summary.columns = grid.first().map_or(0, Vec::len);
    }
    Ok(summary)
}

// Same "no prior data" rule as the price table.
fn load_stored_quotes(path: &Path) -> Vec<QuoteRecord> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(_) => return Vec::new(),
    };
    read_quotes(std::io::BufReader::new(file)).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Stored quote sheet unreadable, starting fresh");
        Vec::new()
    })
}
