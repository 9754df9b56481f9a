use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed price for an instrument on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// What a scraper hands over for one instrument: dated prices, absent days omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedSeries {
    pub instrument: String,
    pub points: Vec<PricePoint>,
}

impl ScrapedSeries {
    pub fn new(instrument: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            instrument: instrument.into(),
            points,
        }
    }

    pub fn empty(instrument: impl Into<String>) -> Self {
        Self::new(instrument, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// How the relative strength is derived when one of the averages is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsPolicy {
    /// Zero average loss gives RS = avg gain; zero average gain gives RS = 1 / (avg loss * 10).
    #[default]
    SourceVariant,
    /// Zero average loss saturates at 100; zero average gain bottoms out at 0.
    Textbook,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiMode {
    /// Trailing window of `rsi_window` points ending at each index.
    #[default]
    Windowed,
    /// Every diff since the start of the series.
    Cumulative,
}

/// Columns of the daily quote sheet, in sheet order (after the trading code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuoteField {
    Date,
    Ycp,
    Ltp,
    Cp,
    Low,
    High,
    Change,
    Volume,
    CompanyName,
    Sector,
    YearlyLow,
    YearlyHigh,
    YearlyRange,
    Nav,
    Eps,
    Dividend,
    LastAgm,
    LastYearGain,
}

impl QuoteField {
    pub const ALL: [QuoteField; 18] = [
        QuoteField::Date,
        QuoteField::Ycp,
        QuoteField::Ltp,
        QuoteField::Cp,
        QuoteField::Low,
        QuoteField::High,
        QuoteField::Change,
        QuoteField::Volume,
        QuoteField::CompanyName,
        QuoteField::Sector,
        QuoteField::YearlyLow,
        QuoteField::YearlyHigh,
        QuoteField::YearlyRange,
        QuoteField::Nav,
        QuoteField::Eps,
        QuoteField::Dividend,
        QuoteField::LastAgm,
        QuoteField::LastYearGain,
    ];

    pub fn header(self) -> &'static str {
        match self {
            QuoteField::Date => "Date",
            QuoteField::Ycp => "YCP (Yesterdays closing price)",
            QuoteField::Ltp => "LTP (Last trading price)",
            QuoteField::Cp => "CP (Closing Price)",
            QuoteField::Low => "Low",
            QuoteField::High => "High",
            QuoteField::Change => "Change",
            QuoteField::Volume => "Volume",
            QuoteField::CompanyName => "Company Name",
            QuoteField::Sector => "Type",
            QuoteField::YearlyLow => "Lowest (yearly)",
            QuoteField::YearlyHigh => "Highest (yearly)",
            QuoteField::YearlyRange => "Range (yearly)",
            QuoteField::Nav => "NAV",
            QuoteField::Eps => "EPS",
            QuoteField::Dividend => "Dividend",
            QuoteField::LastAgm => "Last AGM",
            QuoteField::LastYearGain => "Last 1Y Gain",
        }
    }
}

/// One row of the daily quote / fundamentals sheet.
///
/// Values are kept as the text the exchange publishes; an empty or whitespace-only value
/// is stored as `None` so "absent" has exactly one representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub trading_code: String,
    pub date: Option<String>,
    pub ycp: Option<String>,
    pub ltp: Option<String>,
    pub cp: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub change: Option<String>,
    pub volume: Option<String>,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub yearly_low: Option<String>,
    pub yearly_high: Option<String>,
    pub yearly_range: Option<String>,
    pub nav: Option<String>,
    pub eps: Option<String>,
    pub dividend: Option<String>,
    pub last_agm: Option<String>,
    pub last_year_gain: Option<String>,
}

impl QuoteRecord {
    pub fn new(trading_code: &str) -> Result<Self> {
        let code = trading_code.trim();
        if code.is_empty() {
            return Err(anyhow!("Quote record requires a non-empty trading code"));
        }
        Ok(Self {
            trading_code: code.to_string(),
            ..Default::default()
        })
    }

    pub fn with(mut self, field: QuoteField, value: &str) -> Self {
        self.set(field, Some(value.to_string()));
        self
    }

    pub fn get(&self, field: QuoteField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: QuoteField, value: Option<String>) {
        let normalized = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        *self.slot_mut(field) = normalized;
    }

    fn slot(&self, field: QuoteField) -> &Option<String> {
        match field {
            QuoteField::Date => &self.date,
            QuoteField::Ycp => &self.ycp,
            QuoteField::Ltp => &self.ltp,
            QuoteField::Cp => &self.cp,
            QuoteField::Low => &self.low,
            QuoteField::High => &self.high,
            QuoteField::Change => &self.change,
            QuoteField::Volume => &self.volume,
            QuoteField::CompanyName => &self.company_name,
            QuoteField::Sector => &self.sector,
            QuoteField::YearlyLow => &self.yearly_low,
            QuoteField::YearlyHigh => &self.yearly_high,
            QuoteField::YearlyRange => &self.yearly_range,
            QuoteField::Nav => &self.nav,
            QuoteField::Eps => &self.eps,
            QuoteField::Dividend => &self.dividend,
            QuoteField::LastAgm => &self.last_agm,
            QuoteField::LastYearGain => &self.last_year_gain,
        }
    }

    fn slot_mut(&mut self, field: QuoteField) -> &mut Option<String> {
        match field {
            QuoteField::Date => &mut self.date,
            QuoteField::Ycp => &mut self.ycp,
            QuoteField::Ltp => &mut self.ltp,
            QuoteField::Cp => &mut self.cp,
            QuoteField::Low => &mut self.low,
            QuoteField::High => &mut self.high,
            QuoteField::Change => &mut self.change,
            QuoteField::Volume => &mut self.volume,
            QuoteField::CompanyName => &mut self.company_name,
            QuoteField::Sector => &mut self.sector,
            QuoteField::YearlyLow => &mut self.yearly_low,
            QuoteField::YearlyHigh => &mut self.yearly_high,
            QuoteField::YearlyRange => &mut self.yearly_range,
            QuoteField::Nav => &mut self.nav,
            QuoteField::Eps => &mut self.eps,
            QuoteField::Dividend => &mut self.dividend,
            QuoteField::LastAgm => &mut self.last_agm,
            QuoteField::LastYearGain => &mut self.last_year_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_record_rejects_blank_code() {
        assert!(QuoteRecord::new("   ").is_err());
        assert_eq!(QuoteRecord::new(" BRACBANK ").unwrap().trading_code, "BRACBANK");
    }

    #[test]
    fn test_quote_record_blank_value_is_absent() {
        let record = QuoteRecord::new("GP").unwrap()
            .with(QuoteField::Ltp, " 285.4 ")
            .with(QuoteField::Nav, "   ");
        assert_eq!(record.get(QuoteField::Ltp), Some("285.4"));
        assert_eq!(record.get(QuoteField::Nav), None);
    }

    #[test]
    fn test_rs_policy_serde_names() {
        let policy: RsPolicy = serde_json::from_str("\"textbook\"").unwrap();
        assert_eq!(policy, RsPolicy::Textbook);
        assert_eq!(serde_json::to_string(&RsiMode::Cumulative).unwrap(), "\"cumulative\"");
    }
}
