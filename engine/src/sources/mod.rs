// Where raw market data comes from. The exchange scraper itself lives outside this
// crate; anything that can produce codes, price histories and quote rows plugs in here.
pub mod file_source;

pub use file_source::FileSource;

use crate::error::EngineError;
use shared::models::{QuoteRecord, ScrapedSeries};
use std::future::Future;

pub trait MarketSource: Clone + Send + Sync + 'static {
    /// Trading codes listed under one category (e.g. "A", "B", "BANK").
    fn instruments(&self, category: &str) -> impl Future<Output = Result<Vec<String>, EngineError>> + Send;

    /// Dated prices for one instrument; days without a price are simply absent.
    fn price_history(&self, instrument: &str) -> impl Future<Output = Result<ScrapedSeries, EngineError>> + Send;

    /// Latest quote rows for one category.
    fn quotes(&self, category: &str) -> impl Future<Output = Result<Vec<QuoteRecord>, EngineError>> + Send;
}
