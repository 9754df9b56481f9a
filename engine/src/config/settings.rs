// Engine settings, loaded from a JSON file or falling back to defaults
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::{RsPolicy, RsiMode};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "ENGINE_CONFIG";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub rsi_window: usize,
    pub rsi_policy: RsPolicy,
    pub rsi_mode: RsiMode,
    // Length of the calendar axis ending today.
    pub lookback_days: usize,
    // Only the newest `update_days` dates of the axis accept scraped values.
    pub update_days: usize,
    pub price_table_path: PathBuf,
    // Further price tables (other workbook pages) folded into the main one for the RSI job.
    pub extra_price_tables: Vec<PathBuf>,
    // Unset means `rsi_<label>.csv`, named after the RSI mode.
    pub rsi_table_path: Option<PathBuf>,
    pub source_dir: PathBuf,
    // Stored quote sheets, one `quotes_<CATEGORY>.csv` per category.
    pub quotes_dir: PathBuf,
    // Explicit instrument list; empty means "ask the source".
    pub instruments: Vec<String>,
    // Category names whose code lists are unioned when `instruments` is empty.
    pub categories: Vec<String>,
    pub sink: SinkSettings,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Csv,
    JsonOutbox,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SinkSettings {
    pub kind: SinkKind,
    pub out_dir: PathBuf,
    pub spreadsheet_id: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub price_tab: String,
    // Unset means the RSI label, e.g. "RSI 22D" or "RSI 1Y".
    pub rsi_tab: Option<String>,
}

impl Default for SinkSettings {
    fn default() -> Self {
        SinkSettings {
            kind: SinkKind::Csv,
            out_dir: PathBuf::from("reports"),
            spreadsheet_id: None,
            credentials_path: None,
            price_tab: "Price 1Y".to_string(),
            rsi_tab: None,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            rsi_window: 22,
            rsi_policy: RsPolicy::SourceVariant,
            rsi_mode: RsiMode::Windowed,
            lookback_days: 360,
            update_days: 360,
            price_table_path: PathBuf::from("price_1y.csv"),
            extra_price_tables: Vec::new(),
            rsi_table_path: None,
            source_dir: PathBuf::from("prices"),
            quotes_dir: PathBuf::from("quote_sheets"),
            instruments: Vec::new(),
            categories: vec!["A".to_string(), "B".to_string(), "BANK".to_string()],
            sink: SinkSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let settings: EngineSettings = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ConfigError(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    // Reads the file named by ENGINE_CONFIG, or returns defaults when the variable is unset.
    pub fn from_env() -> Result<Self, EngineError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                tracing::info!("{} not set, using default settings", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// "RSI 22D" for the windowed engine, "RSI 1Y" for the cumulative one.
    pub fn rsi_label(&self) -> String {
        match self.rsi_mode {
            RsiMode::Windowed => format!("RSI {}D", self.rsi_window),
            RsiMode::Cumulative => "RSI 1Y".to_string(),
        }
    }

    pub fn rsi_tab(&self) -> String {
        self.sink.rsi_tab.clone().unwrap_or_else(|| self.rsi_label())
    }

    pub fn rsi_table_path(&self) -> PathBuf {
        self.rsi_table_path.clone().unwrap_or_else(|| {
            let stem = self.rsi_label().to_lowercase().replace(' ', "_");
            PathBuf::from(format!("{}.csv", stem))
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rsi_window == 0 {
            return Err(EngineError::ConfigError("rsi_window must be greater than 0".to_string()));
        }
        if self.lookback_days == 0 {
            return Err(EngineError::ConfigError("lookback_days must be greater than 0".to_string()));
        }
        if self.update_days == 0 {
            return Err(EngineError::ConfigError("update_days must be greater than 0".to_string()));
        }
        Ok(())
    }
}
