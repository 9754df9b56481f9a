// Technical indicators module
pub mod cumulative_rsi;
pub mod rsi;

pub use cumulative_rsi::CumulativeRsi;
pub use rsi::Rsi;

use crate::error::EngineError;
use serde_json::Value;
use shared::models::{RsPolicy, RsiMode};

// Common trait for all indicators over a daily price column
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    // One output per input point; missing prices are the caller's `None`s.
    fn calculate(&self, prices: &[Option<f64>]) -> Vec<f64>;
}

pub fn build_calculator(
    mode: RsiMode,
    window: usize,
    policy: RsPolicy,
) -> Result<Box<dyn IndicatorCalculator>, EngineError> {
    match mode {
        RsiMode::Windowed => {
            if window == 0 {
                return Err(EngineError::IndicatorError("RSI window cannot be 0".to_string()));
            }
            Ok(Box::new(Rsi::new(window, policy)))
        }
        RsiMode::Cumulative => Ok(Box::new(CumulativeRsi::new(policy))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_calculator_windowed() {
        let calc = build_calculator(RsiMode::Windowed, 30, RsPolicy::SourceVariant).unwrap();
        assert_eq!(calc.name(), "RSI(30)");
    }

    #[test]
    fn test_build_calculator_zero_window() {
        assert!(build_calculator(RsiMode::Windowed, 0, RsPolicy::SourceVariant).is_err());
        // The cumulative mode ignores the window.
        assert!(build_calculator(RsiMode::Cumulative, 0, RsPolicy::SourceVariant).is_ok());
    }
}
