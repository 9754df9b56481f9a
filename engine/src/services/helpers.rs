// Helpers shared by the batch job handlers
use crate::config::settings::EngineSettings;
use crate::data::calendar::last_n_days;
use crate::data::merge::{union_instruments, MergeOptions};
use crate::sources::MarketSource;
use chrono::NaiveDate;
use tokio::task::JoinSet;

// Log a progress line every this many instruments.
pub const PROGRESS_EVERY: usize = 25;

/// Calendar axis of `lookback_days` ending today; only the newest `update_days` of it
/// accept scraped values.
pub fn window_options(lookback_days: usize, update_days: usize, today: NaiveDate) -> MergeOptions {
    let axis = last_n_days(lookback_days, today);
    let accept_since = axis.get(axis.len().saturating_sub(update_days)).copied();
    MergeOptions { axis, accept_since }
}

/// Explicit instrument list from settings, or the union of every category's code list.
/// Category lists are fetched concurrently; a failing category contributes nothing.
pub async fn resolve_instruments<S: MarketSource>(settings: &EngineSettings, source: &S) -> Vec<String> {
    if !settings.instruments.is_empty() {
        return union_instruments(&[settings.instruments.clone()]);
    }

    let mut tasks = JoinSet::new();
    for (idx, category) in settings.categories.iter().enumerate() {
        let source = source.clone();
        let category = category.clone();
        tasks.spawn(async move {
            let result = source.instruments(&category).await;
            (idx, category, result)
        });
    }

    let mut lists: Vec<Vec<String>> = vec![Vec::new(); settings.categories.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, category, Ok(codes))) => {
                tracing::info!(category = %category, count = codes.len(), "Fetched trading codes");
                lists[idx] = codes;
            }
            Ok((_, category, Err(e))) => {
                tracing::warn!(category = %category, error = %e, "Failed to fetch trading codes");
            }
            Err(e) => {
                tracing::error!(error = %e, "Trading code task did not complete");
            }
        }
    }
    union_instruments(&lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::FileSource;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_options() {
        let options = window_options(5, 2, ymd(2024, 1, 10));
        assert_eq!(options.axis.len(), 5);
        assert_eq!(options.axis[0], ymd(2024, 1, 6));
        assert_eq!(options.accept_since, Some(ymd(2024, 1, 9)));
    }

    #[test]
    fn test_window_options_update_span_longer_than_axis() {
        let options = window_options(3, 10, ymd(2024, 1, 10));
        assert_eq!(options.accept_since, Some(ymd(2024, 1, 8)));
    }

    #[tokio::test]
    async fn test_resolve_instruments_unions_categories_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("codes_A.txt"), "ACI\nGP\n").unwrap();
        std::fs::write(dir.path().join("codes_B.txt"), "GP\nAAMRANET\n").unwrap();
        std::fs::write(dir.path().join("codes_BANK.txt"), "BRACBANK\nACI\n").unwrap();
        let settings = EngineSettings::default();
        let codes = resolve_instruments(&settings, &FileSource::new(dir.path())).await;
        assert_eq!(codes, vec!["ACI", "GP", "AAMRANET", "BRACBANK"]);
    }

    #[tokio::test]
    async fn test_resolve_instruments_tolerates_missing_category() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("codes_B.txt"), "GP\n").unwrap();
        let settings = EngineSettings::default();
        let codes = resolve_instruments(&settings, &FileSource::new(dir.path())).await;
        assert_eq!(codes, vec!["GP"]);
    }

    #[tokio::test]
    async fn test_resolve_instruments_prefers_explicit_list() {
        let settings = EngineSettings {
            instruments: vec!["GP".to_string(), "GP".to_string(), "ACI".to_string()],
            ..EngineSettings::default()
        };
        let codes = resolve_instruments(&settings, &FileSource::new("unused")).await;
        assert_eq!(codes, vec!["GP", "ACI"]);
    }
}
