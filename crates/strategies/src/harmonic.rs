use crate::error::StrategyError;
use crate::SignalGenerator;
use core_types::{MarketPair, PositionSide, Signal, StrategyKind};
use rand::{Rng, RngCore};

/// Tuning of the scanner's two random draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerParams {
    /// A pattern is detected only when the first draw is strictly above this value.
    pub detection_threshold: f64,
    /// The second draw at or above this value means LONG, below it SHORT.
    pub bullish_cutoff: f64,
}

impl Default for ScannerParams {
    /// A 2% chance per pair per tick, with no directional bias.
    fn default() -> Self {
        Self {
            detection_threshold: 0.98,
            bullish_cutoff: 0.5,
        }
    }
}

/// Stochastic stand-in for harmonic pattern recognition.
///
/// Every call draws `r` in `[0, 1)`. Unless `r` exceeds the detection threshold
/// nothing happens; otherwise an independent second draw picks the side. The
/// configured `StrategyKind` never changes the odds or the direction, only the
/// wording of the resulting signal.
pub struct HarmonicScanner<R> {
    rng: R,
    params: ScannerParams,
}

impl<R: RngCore> HarmonicScanner<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            params: ScannerParams::default(),
        }
    }

    /// Creates a scanner with custom odds. Both values must lie in `[0, 1]`.
    pub fn with_params(rng: R, params: ScannerParams) -> Result<Self, StrategyError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(params.detection_threshold) || !in_unit(params.bullish_cutoff) {
            return Err(StrategyError::InvalidParameters(format!(
                "scanner thresholds must lie in [0, 1], got detection={} bullish={}",
                params.detection_threshold, params.bullish_cutoff
            )));
        }
        Ok(Self { rng, params })
    }

    pub fn params(&self) -> ScannerParams {
        self.params
    }
}

impl<R: RngCore + Send> SignalGenerator for HarmonicScanner<R> {
    fn analyze(&mut self, pair: &MarketPair, strategy: StrategyKind) -> Option<Signal> {
        let r: f64 = self.rng.r#gen();
        if r <= self.params.detection_threshold {
            return None;
        }

        let side = if self.rng.r#gen::<f64>() >= self.params.bullish_cutoff {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        tracing::debug!(symbol = %pair.symbol, %side, %strategy, draw = r, "Harmonic pattern detected.");

        Some(Signal {
            symbol: pair.symbol.clone(),
            side,
            pattern: strategy,
        })
    }
}
