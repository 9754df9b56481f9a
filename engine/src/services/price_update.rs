// Handler for the price update job: previous table + fresh histories -> merged table
use super::helpers::{resolve_instruments, window_options, PROGRESS_EVERY};
use super::RunSummary;
use crate::config::settings::EngineSettings;
use crate::data::merge::{merge_with, MergeResult};
use crate::data::sheet::{load_previous, SheetTable};
use crate::error::EngineError;
use crate::sink::ReportSink;
use crate::sources::MarketSource;
use chrono::NaiveDate;
use uuid::Uuid;

pub async fn handle_update_prices<S: MarketSource>(
    run_id: Uuid,
    settings: &EngineSettings,
    source: &S,
    sink: &dyn ReportSink,
    today: NaiveDate,
) -> Result<RunSummary, EngineError> {
    let mut summary = RunSummary::new(run_id, "prices");
    let previous = load_previous(&settings.price_table_path);

    let instruments = resolve_instruments(settings, source).await;
    summary.requested = instruments.len();
    tracing::info!(count = instruments.len(), "Found trading codes");

    // One instrument at a time; a failure only costs that instrument this run.
    let mut scraped = Vec::with_capacity(instruments.len());
    for (idx, code) in instruments.iter().enumerate() {
        match source.price_history(code).await {
            Ok(series) => {
                tracing::debug!(instrument = %code, points = series.points.len(), "Fetched price history");
                scraped.push(series);
            }
            Err(e) => {
                tracing::error!(instrument = %code, error = %e, "Failed to fetch price history");
                summary.failed.push(code.clone());
            }
        }
        let done = idx + 1;
        if done % PROGRESS_EVERY == 0 || done == instruments.len() {
            tracing::info!(done, total = instruments.len(), "Fetching price histories");
        }
    }
    summary.fetched = scraped.len();

    let options = window_options(settings.lookback_days, settings.update_days, today);
    let MergeResult { table, stats } = merge_with(&previous, &scraped, &instruments, &options);
    tracing::info!(
        rows = table.row_count(),
        columns = table.column_count(),
        present = table.present_cells(),
        new_instruments = stats.new_instruments,
        new_dates = stats.new_dates,
        filled = stats.cells_filled,
        overwritten = stats.cells_overwritten,
        ignored = stats.points_ignored,
        "Merged price table"
    );

    let sheet = SheetTable::from_matrix(&table);
    sheet.write_csv(&settings.price_table_path)?;
    tracing::info!(path = %settings.price_table_path.display(), "Price table saved");
    sink.publish(&settings.sink.price_tab, &sheet.to_grid())?;

    summary.rows = table.row_count();
    summary.columns = table.column_count();
    summary.merge = Some(stats);
    Ok(summary)
}
