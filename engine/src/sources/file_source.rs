// MarketSource backed by a directory of scraper dumps:
//   codes_<CATEGORY>.txt   one trading code per line
//   <CODE>.csv             "Date,Price" history payload
//   quotes_<CATEGORY>.csv  quote sheet rows
use super::MarketSource;
use crate::data::payload::parse_price_payload;
use crate::data::quotes::read_quotes;
use crate::error::EngineError;
use shared::models::{QuoteRecord, ScrapedSeries};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, name: &str, instrument: &str) -> Result<String, EngineError> {
        let path = self.root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EngineError::source_error(instrument, format!("{}: {}", path.display(), e)))
    }
}

impl MarketSource for FileSource {
    async fn instruments(&self, category: &str) -> Result<Vec<String>, EngineError> {
        let text = self.read(&format!("codes_{}.txt", category), category).await?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    async fn price_history(&self, instrument: &str) -> Result<ScrapedSeries, EngineError> {
        let text = self.read(&format!("{}.csv", instrument), instrument).await?;
        parse_price_payload(instrument, &text)
    }

    async fn quotes(&self, category: &str) -> Result<Vec<QuoteRecord>, EngineError> {
        let text = self.read(&format!("quotes_{}.csv", category), category).await?;
        read_quotes(text.as_bytes())
    }
}
