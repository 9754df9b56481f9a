// Cumulative RSI: every diff since the start of the series feeds the averages.
// Used for the one-year sheet, where no trailing window applies.
use super::rsi::{rsi_from_averages, Averager};
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::RsPolicy;

pub struct CumulativeRsi {
    policy: RsPolicy,
}

impl CumulativeRsi {
    pub fn new(policy: RsPolicy) -> Self {
        Self { policy }
    }
}

impl IndicatorCalculator for CumulativeRsi {
    fn name(&self) -> &str {
        "RSI(cumulative)"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "policy": self.policy })
    }

    fn calculate(&self, prices: &[Option<f64>]) -> Vec<f64> {
        compute_cumulative_rsi(prices, self.policy)
    }
}

/// Same zero rules as the windowed RSI, but gains and losses accumulate across the
/// whole series. A gap yields 0 at the gap and right after it, and adds no diff, yet
/// the accumulated history on either side of it is kept.
pub fn compute_cumulative_rsi(prices: &[Option<f64>], policy: RsPolicy) -> Vec<f64> {
    let mut gains = Averager::default();
    let mut losses = Averager::default();
    let mut results = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        let (prev, curr) = match (i.checked_sub(1).and_then(|p| prices[p]), prices[i]) {
            (Some(prev), Some(curr)) => (prev, curr),
            _ => {
                results.push(0.0);
                continue;
            }
        };

        let diff = curr - prev;
        if diff > 0.0 {
            gains.push(diff);
        } else if diff < 0.0 {
            losses.push(-diff);
        }
        results.push(rsi_from_averages(gains.mean(), losses.mean(), policy));
    }
    results
}
