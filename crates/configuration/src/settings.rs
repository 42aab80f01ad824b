use core_types::StrategyKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The default trading universe: the top 30 USDT spot pairs.
pub const DEFAULT_SYMBOLS: [&str; 30] = [
    "BTC_USDT", "ETH_USDT", "SOL_USDT", "XRP_USDT", "ADA_USDT",
    "DOGE_USDT", "AVAX_USDT", "DOT_USDT", "TRX_USDT", "MATIC_USDT",
    "LTC_USDT", "SHIB_USDT", "LINK_USDT", "BCH_USDT", "ATOM_USDT",
    "UNI_USDT", "LEO_USDT", "ETC_USDT", "XMR_USDT", "XLM_USDT",
    "ICP_USDT", "FIL_USDT", "HBAR_USDT", "APT_USDT", "VET_USDT",
    "NEAR_USDT", "QNT_USDT", "AAVE_USDT", "ALGO_USDT", "EGLD_USDT",
];

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub bot: BotConfig,
    pub feed: FeedSettings,
    pub logging: LoggingSettings,
}

/// Parameters of the simulation engine itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Starting quote-currency balance (USDT).
    pub initial_balance: Decimal,
    /// Period of the engine tick.
    pub tick_interval_ms: u64,
    /// Seed for the signal scanner. A fresh entropy seed is used when absent.
    pub rng_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_balance: dec!(10000),
            tick_interval_ms: 1_000,
            rng_seed: None,
        }
    }
}

/// The operator-controlled bot configuration.
///
/// The engine holds a copy and replaces it wholesale on every update. Merging
/// a partial edit into a full `BotConfig` is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub strategy: StrategyKind,
    /// Percent of the available balance committed as margin per new position.
    pub trade_amount_percent: Decimal,
    /// Multiplier applied to positions opened from now on.
    pub leverage: u32,
    /// Cap on concurrently open positions.
    pub max_positions: usize,
    /// Gates signal generation only. Exits keep running while paused.
    pub is_running: bool,
    /// Display-only flag, does not change any math.
    pub is_simulation: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::HarmonicGartley,
            trade_amount_percent: dec!(5),
            leverage: 5,
            max_positions: 5,
            is_running: false,
            is_simulation: true,
        }
    }
}

impl BotConfig {
    /// Returns a copy with the running flag set, leaving everything else untouched.
    pub fn with_running(&self, is_running: bool) -> Self {
        Self {
            is_running,
            ..self.clone()
        }
    }
}

/// Where market data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FeedSource {
    /// Public Gate.io spot tickers.
    #[default]
    Gate,
    /// Offline seeded random walk.
    Synthetic,
}

/// Parameters of the price-feed collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub source: FeedSource,
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
    /// The symbols the engine tracks. Tickers outside this list are ignored.
    pub symbols: Vec<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            source: FeedSource::Gate,
            base_url: "https://api.gateio.ws/api/v4".to_string(),
            poll_interval_ms: 5_000,
            timeout_ms: 4_000,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for a daily-rolling log file. Console only when absent.
    pub directory: Option<PathBuf>,
    /// How many engine activity entries the runner keeps for display.
    pub max_log_window: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            max_log_window: 50,
        }
    }
}
