// Parser for the exchange's per-instrument price history payload:
//   Date,Price
//   2024-01-02,12.3
use crate::error::EngineError;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use shared::models::{PricePoint, ScrapedSeries};
use shared::utils::sheet_format;
use std::collections::BTreeMap;

/// Parses one instrument's `Date,Price` payload.
///
/// Lines with an unreadable date or a non-numeric price are omitted (absent, never
/// zero). Fields after the date are rejoined, so `1,011.5` reads as 1011.5. A repeated date keeps the last price. Points come out in ascending date order.
pub fn parse_price_payload(instrument: &str, text: &str) -> Result<ScrapedSeries, EngineError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let is_price_header = headers.len() >= 2
        && headers[0].eq_ignore_ascii_case("date")
        && headers[1].eq_ignore_ascii_case("price");
    if !is_price_header {
        return Err(EngineError::source_error(
            instrument,
            format!("unexpected payload header {:?}", headers.iter().collect::<Vec<_>>()),
        ));
    }

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result?;
        let (Some(date_str), Some(_)) = (record.get(0), record.get(1)) else {
            skipped += 1;
            continue;
        };
        // An unquoted thousands separator splits the price across several fields.
        let price_str = record.iter().skip(1).collect::<Vec<_>>().join(",");
        match (sheet_format::parse_source_date(date_str), sheet_format::parse_price(&price_str)) {
            (Ok(date), Ok(price)) => {
                by_date.insert(date, price);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(instrument, skipped, "Omitted unreadable payload lines");
    }

    let points = by_date.into_iter().map(|(date, price)| PricePoint::new(date, price)).collect();
    Ok(ScrapedSeries::new(instrument, points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_payload_sorted_and_deduplicated() {
        let text = "Date,Price\n2024-01-03,13\n2024-01-02,12\n2024-01-03,13.5\n";
        let series = parse_price_payload("AAA", text).unwrap();
        assert_eq!(series.instrument, "AAA");
        assert_eq!(
            series.points,
            vec![PricePoint::new(ymd(2024, 1, 2), 12.0), PricePoint::new(ymd(2024, 1, 3), 13.5)]
        );
    }

    #[test]
    fn test_parse_payload_omits_bad_lines() {
        let text = "Date,Price\n2024-01-02,NaN\nnot a date,5\n2024-01-04,\n02/01/2024,7\n2024-01-05";
        let series = parse_price_payload("AAA", text).unwrap();
        // Only the sheet-formatted line survives; absent prices are not zero.
        assert_eq!(series.points, vec![PricePoint::new(ymd(2024, 1, 2), 7.0)]);
    }

    #[test]
    fn test_parse_payload_unquoted_thousands_separator() {
        let text = "Date,Price\n2024-01-02,1,011.5\n2024-01-03,\"1,020\"\n2024-01-04,12,34,5\n";
        let series = parse_price_payload("AAA", text).unwrap();
        assert_eq!(
            series.points,
            vec![
                PricePoint::new(ymd(2024, 1, 2), 1011.5),
                PricePoint::new(ymd(2024, 1, 3), 1020.0),
                PricePoint::new(ymd(2024, 1, 4), 12345.0),
            ]
        );
    }

    #[test]
    fn test_parse_payload_empty_body() {
        let series = parse_price_payload("AAA", "Date,Price\n").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_parse_payload_wrong_header() {
        let err = parse_price_payload("AAA", "<html>blocked</html>").unwrap_err();
        assert!(matches!(err, EngineError::SourceError { ref instrument, .. } if instrument == "AAA"));
    }
}
