// Engine main entry point: runs one batch job and exits
use engine::config::settings::EngineSettings;
use engine::data::calendar;
use engine::services::{compute_rsi, refresh_quotes, update_prices, RunSummary};
use engine::sink::build_sink;
use engine::sources::FileSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: engine [prices|rsi|quotes|all]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default `info` level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let job = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let settings = EngineSettings::from_env()?;
    let source = FileSource::new(&settings.source_dir);
    let sink = build_sink(&settings.sink)?;
    let today = calendar::today();

    info!(job = %job, source = %source.root().display(), "Starting engine job");

    match job.as_str() {
        "prices" => report(&update_prices(&settings, &source, sink.as_ref(), today).await?),
        "rsi" => report(&compute_rsi(&settings, sink.as_ref())?),
        "quotes" => report(&refresh_quotes(&settings, &source, sink.as_ref()).await?),
        "all" => {
            report(&update_prices(&settings, &source, sink.as_ref(), today).await?);
            report(&compute_rsi(&settings, sink.as_ref())?);
        }
        other => anyhow::bail!("Unknown job '{}'. {}", other, USAGE),
    }
    Ok(())
}

fn report(summary: &RunSummary) {
    info!(
        run_id = %summary.run_id,
        job = summary.job,
        requested = summary.requested,
        fetched = summary.fetched,
        failed = summary.failed.len(),
        rows = summary.rows,
        columns = summary.columns,
        "Job finished"
    );
    if !summary.failed.is_empty() {
        tracing::warn!(failed = ?summary.failed, "Some items produced no data this run");
    }
}
