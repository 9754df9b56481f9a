// Batch jobs. Each public entry point opens a span tagged with a fresh run id and the
// job name, then hands off to the handler in its sibling module.
use crate::config::settings::EngineSettings;
use crate::data::merge::MergeStats;
use crate::error::EngineError;
use crate::sink::ReportSink;
use crate::sources::MarketSource;
use chrono::NaiveDate;
use tracing::Instrument;
use uuid::Uuid;

pub mod helpers;
pub mod price_update;
pub mod quote_refresh;
pub mod rsi_report;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub job: &'static str,
    pub requested: usize,
    pub fetched: usize,
    pub failed: Vec<String>,
    pub rows: usize,
    pub columns: usize,
    pub merge: Option<MergeStats>,
}

impl RunSummary {
    pub(crate) fn new(run_id: Uuid, job: &'static str) -> Self {
        Self {
            run_id,
            job,
            requested: 0,
            fetched: 0,
            failed: Vec::new(),
            rows: 0,
            columns: 0,
            merge: None,
        }
    }
}

pub async fn update_prices<S: MarketSource>(
    settings: &EngineSettings,
    source: &S,
    sink: &dyn ReportSink,
    today: NaiveDate,
) -> Result<RunSummary, EngineError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, job = "prices");
    price_update::handle_update_prices(run_id, settings, source, sink, today)
        .instrument(span)
        .await
}

pub fn compute_rsi(settings: &EngineSettings, sink: &dyn ReportSink) -> Result<RunSummary, EngineError> {
    let run_id = Uuid::new_v4();
    let _guard = tracing::info_span!("run", %run_id, job = "rsi").entered();
    rsi_report::handle_compute_rsi(run_id, settings, sink)
}

pub async fn refresh_quotes<S: MarketSource>(
    settings: &EngineSettings,
    source: &S,
    sink: &dyn ReportSink,
) -> Result<RunSummary, EngineError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, job = "quotes");
    quote_refresh::handle_refresh_quotes(run_id, settings, source, sink)
        .instrument(span)
        .await
}
