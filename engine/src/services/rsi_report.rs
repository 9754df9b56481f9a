// Handler for the RSI job: persisted price table -> RSI table on the same axis
use super::RunSummary;
use crate::config::settings::EngineSettings;
use crate::data::merge::combine_sorted;
use crate::data::price_matrix::PriceMatrix;
use crate::data::sheet::SheetTable;
use crate::error::EngineError;
use crate::indicators::{build_calculator, IndicatorCalculator};
use crate::sink::ReportSink;
use std::path::Path;
use uuid::Uuid;

/// Applies `calculator` to every instrument column. Every output cell is present.
pub fn rsi_table(prices: &PriceMatrix, calculator: &dyn IndicatorCalculator) -> PriceMatrix {
    prices.map_columns(|column| calculator.calculate(column))
}

fn read_price_table(path: &Path) -> Result<PriceMatrix, EngineError> {
    SheetTable::read_csv(path)
        .map(SheetTable::into_matrix)
        .map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Cannot read price table");
            e
        })
}

/// Loads the main price table, folding in every extra page with sorted columns.
pub fn load_price_tables(settings: &EngineSettings) -> Result<PriceMatrix, EngineError> {
    // Unlike the price job, a missing price table is fatal here: there is nothing to compute.
    let main = read_price_table(&settings.price_table_path)?;
    if settings.extra_price_tables.is_empty() {
        return Ok(main);
    }
    let mut pages = vec![main];
    for path in &settings.extra_price_tables {
        pages.push(read_price_table(path)?);
    }
    let combined = combine_sorted(&pages);
    tracing::info!(
        pages = pages.len(),
        instruments = combined.column_count(),
        rows = combined.row_count(),
        "Combined price tables"
    );
    Ok(combined)
}

pub fn handle_compute_rsi(
    run_id: Uuid,
    settings: &EngineSettings,
    sink: &dyn ReportSink,
) -> Result<RunSummary, EngineError> {
    let mut summary = RunSummary::new(run_id, "rsi");
    let prices = load_price_tables(settings)?;

    let calculator = build_calculator(settings.rsi_mode, settings.rsi_window, settings.rsi_policy)?;
    tracing::info!(
        indicator = calculator.name(),
        parameters = %calculator.parameters(),
        instruments = prices.column_count(),
        rows = prices.row_count(),
        "Calculating RSI"
    );

    let table = rsi_table(&prices, calculator.as_ref());
    let sheet = SheetTable::from_matrix(&table);
    let path = settings.rsi_table_path();
    sheet.write_csv(&path)?;
    tracing::info!(path = %path.display(), "RSI table saved");
    sink.publish(&settings.rsi_tab(), &sheet.to_grid())?;

    summary.requested = prices.column_count();
    summary.fetched = prices.column_count();
    summary.rows = table.row_count();
    summary.columns = table.column_count();
    Ok(summary)
}
