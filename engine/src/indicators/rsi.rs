// Relative Strength Index (RSI) over a trailing window of daily prices
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::RsPolicy;
use shared::utils::sheet_format::round2;

pub struct Rsi {
    name: String,
    window: usize,
    policy: RsPolicy,
}

impl Rsi {
    pub fn new(window: usize, policy: RsPolicy) -> Self {
        Self {
            name: format!("RSI({})", window),
            window,
            policy,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window, "policy": self.policy })
    }

    fn calculate(&self, prices: &[Option<f64>]) -> Vec<f64> {
        compute_rsi(prices, self.window, self.policy)
    }
}

/// Computes one RSI reading per input point.
///
/// A point is 0 when it is the first point, when its price is missing, or when the
/// previous price is missing. Otherwise the diffs inside the trailing window of up to
/// `window` points ending at that index are averaged; pairs with a missing side inside
/// the window contribute nothing. Readings are rounded to two decimals.
pub fn compute_rsi(prices: &[Option<f64>], window: usize, policy: RsPolicy) -> Vec<f64> {
    let window = window.max(1);
    let mut results = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        if i == 0 || prices[i].is_none() || prices[i - 1].is_none() {
            results.push(0.0);
            continue;
        }

        let start = (i + 1).saturating_sub(window);
        let mut gains = Averager::default();
        let mut losses = Averager::default();

        for pair in prices[start..=i].windows(2) {
            if let (Some(prev), Some(curr)) = (pair[0], pair[1]) {
                let diff = curr - prev;
                if diff > 0.0 {
                    gains.push(diff);
                } else if diff < 0.0 {
                    losses.push(-diff);
                }
            }
        }

        results.push(rsi_from_averages(gains.mean(), losses.mean(), policy));
    }
    results
}

/// Maps average gain/loss to a rounded RSI reading under the given RS policy.
pub(crate) fn rsi_from_averages(avg_gain: f64, avg_loss: f64, policy: RsPolicy) -> f64 {
    let rs = match policy {
        RsPolicy::SourceVariant => {
            if avg_gain == 0.0 && avg_loss == 0.0 {
                1.0
            } else if avg_loss == 0.0 {
                avg_gain
            } else if avg_gain == 0.0 {
                1.0 / (avg_loss * 10.0)
            } else {
                avg_gain / avg_loss
            }
        }
        RsPolicy::Textbook => {
            if avg_gain == 0.0 && avg_loss == 0.0 {
                1.0
            } else if avg_loss == 0.0 {
                return 100.0;
            } else {
                avg_gain / avg_loss
            }
        }
    };
    round2(100.0 - 100.0 / (1.0 + rs))
}

// Running mean; zero when nothing was pushed.
#[derive(Default)]
pub(crate) struct Averager {
    sum: f64,
    count: usize,
}

impl Averager {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_rsi_worked_example() {
        let results = compute_rsi(&series(&[10.0, 11.0, 10.0, 12.0]), 3, RsPolicy::SourceVariant);
        // [0]: first point. [1]: +1 only -> RS = avg gain = 1 -> 50.
        // [2]: +1, -1 -> RS = 1 -> 50. [3]: window [11, 10, 12] -> -1, +2 -> RS = 2 -> 66.67.
        assert_eq!(results, vec![0.0, 50.0, 50.0, 66.67]);
    }

    #[test]
    fn test_rsi_single_point_is_zero() {
        assert_eq!(compute_rsi(&[Some(42.0)], 14, RsPolicy::SourceVariant), vec![0.0]);
        assert_eq!(compute_rsi(&[Some(42.0)], 1, RsPolicy::Textbook), vec![0.0]);
    }

    #[test]
    fn test_rsi_empty_series() {
        assert!(compute_rsi(&[], 22, RsPolicy::SourceVariant).is_empty());
    }

    #[test]
    fn test_rsi_point_after_missing_is_zero() {
        let prices = vec![Some(10.0), None, Some(12.0), Some(13.0)];
        for window in [1, 2, 3, 22] {
            let results = compute_rsi(&prices, window, RsPolicy::SourceVariant);
            assert_eq!(results.len(), 4);
            assert_eq!(results[1], 0.0, "missing point, window {}", window);
            assert_eq!(results[2], 0.0, "point after missing, window {}", window);
        }
    }

    #[test]
    fn test_rsi_window_skips_pairs_across_gap() {
        // Window covers [None, 12, 13]: only the +1 diff counts -> RS = 1 -> 50.
        let prices = vec![Some(10.0), None, Some(12.0), Some(13.0)];
        let results = compute_rsi(&prices, 3, RsPolicy::SourceVariant);
        assert_eq!(results[3], 50.0);
    }

    #[test]
    fn test_rsi_flat_prices() {
        let results = compute_rsi(&series(&[5.0, 5.0, 5.0]), 22, RsPolicy::SourceVariant);
        // No gains, no losses -> RS = 1 -> 50.
        assert_eq!(results, vec![0.0, 50.0, 50.0]);
    }

    #[test]
    fn test_rsi_window_one_has_no_diffs() {
        // A one-point window holds no pairs, so every defined reading is the flat 50.
        let results = compute_rsi(&series(&[1.0, 3.0, 2.0]), 1, RsPolicy::SourceVariant);
        assert_eq!(results, vec![0.0, 50.0, 50.0]);
    }

    // The two policies disagree whenever one of the averages is zero. Both are kept on
    // purpose; these tests pin each behavior rather than picking a winner.
    #[test]
    fn test_policies_diverge_on_zero_average_loss() {
        let prices = series(&[10.0, 13.0]);
        // Source variant: RS = avg gain = 3 -> 100 - 100/4 = 75.
        assert_eq!(compute_rsi(&prices, 14, RsPolicy::SourceVariant)[1], 75.0);
        // Textbook: no losses saturates at 100.
        assert_eq!(compute_rsi(&prices, 14, RsPolicy::Textbook)[1], 100.0);
    }

    #[test]
    fn test_policies_diverge_on_zero_average_gain() {
        let prices = series(&[10.0, 8.0]);
        // Source variant: RS = 1 / (2 * 10) = 0.05 -> 100 - 100/1.05 = 4.76.
        assert_eq!(compute_rsi(&prices, 14, RsPolicy::SourceVariant)[1], 4.76);
        // Textbook: RS = 0 -> 0.
        assert_eq!(compute_rsi(&prices, 14, RsPolicy::Textbook)[1], 0.0);
    }

    #[test]
    fn test_policies_agree_when_both_averages_present() {
        let prices = series(&[10.0, 11.0, 10.0, 12.0]);
        assert_eq!(
            compute_rsi(&prices, 3, RsPolicy::SourceVariant),
            compute_rsi(&prices, 3, RsPolicy::Textbook)
        );
    }

    #[test]
    fn test_rsi_bounded() {
        let prices: Vec<Option<f64>> = (0..200)
            .map(|i| {
                if i % 17 == 5 {
                    None
                } else {
                    Some(100.0 + ((i * 37) % 23) as f64 - 11.0 + (i as f64) * 0.1)
                }
            })
            .collect();
        for policy in [RsPolicy::SourceVariant, RsPolicy::Textbook] {
            for window in [1, 2, 5, 14, 22, 30, 500] {
                let results = compute_rsi(&prices, window, policy);
                assert_eq!(results.len(), prices.len());
                for (i, value) in results.iter().enumerate() {
                    assert!((0.0..=100.0).contains(value), "index {} window {}: {}", i, window, value);
                }
            }
        }
    }

    #[test]
    fn test_rsi_all_gains_source_variant() {
        let prices = series(&(1..=20).map(|i| i as f64).collect::<Vec<_>>());
        let results = compute_rsi(&prices, 14, RsPolicy::SourceVariant);
        // Every diff is +1 -> RS = 1 -> 50 under the source variant.
        assert!(results[1..].iter().all(|v| *v == 50.0));
    }

    #[test]
    fn test_calculator_name_and_parameters() {
        let rsi = Rsi::new(22, RsPolicy::Textbook);
        assert_eq!(rsi.name(), "RSI(22)");
        assert_eq!(rsi.parameters()["window"], 22);
        assert_eq!(rsi.parameters()["policy"], "textbook");
    }
}
