// Formatting rules for the spreadsheet layout and the exchange's price payloads.
pub mod sheet_format {
    use std::str::FromStr;
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;

    pub const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";
    const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

    // Parses the first-column date of a sheet row, "dd/mm/yyyy"
    pub fn parse_sheet_date(s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), SHEET_DATE_FORMAT)
            .map_err(|e| anyhow!("Failed to parse sheet date '{}': {}", s, e))
    }

    pub fn format_sheet_date(date: NaiveDate) -> String {
        date.format(SHEET_DATE_FORMAT).to_string()
    }

    // The price graph endpoint emits ISO dates; older dumps use the sheet format.
    pub fn parse_source_date(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, SHEET_DATE_FORMAT))
            .map_err(|e| anyhow!("Failed to parse source date '{}': {}", s, e))
    }

    // Parses prices like "1,234.50" or "12.3"; NaN and infinities are rejected.
    pub fn parse_price(s: &str) -> Result<f64> {
        let normalized = s.trim().replace(',', "");
        let value = f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse price '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Price '{}' is not a finite number", s));
        }
        Ok(value)
    }

    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    // Spreadsheet column letter for a 0-based index: 0 -> A, 25 -> Z, 26 -> AA.
    pub fn column_letter(index: usize) -> String {
        let mut letters = Vec::new();
        let mut n = index + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }

}
