use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Sheet format error: {0}")]
    SheetFormatError(String),

    // A scraper-side failure for a single instrument; the batch keeps going.
    #[error("Source error for '{instrument}': {message}")]
    SourceError { instrument: String, message: String },

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    pub fn source_error(instrument: &str, message: impl std::fmt::Display) -> Self {
        EngineError::SourceError {
            instrument: instrument.to_string(),
            message: message.to_string(),
        }
    }
}
