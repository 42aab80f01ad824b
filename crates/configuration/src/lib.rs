use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    BotConfig, EngineSettings, FeedSettings, FeedSource, LoggingSettings, Settings, DEFAULT_SYMBOLS,
};

/// Prefix for environment overrides, e.g. `HARMONIC__BOT__LEVERAGE=10`.
pub const ENV_PREFIX: &str = "HARMONIC";

/// Loads the application settings.
///
/// Sources are layered in order: built-in defaults, the TOML file at `path`
/// (`config.toml` when `None`, and optional in that case), then `HARMONIC__*`
/// environment variables. The merged result is validated before it is returned.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("feed.symbols"),
        )
        .build()?;

    finish(builder)
}

/// Parses settings from an inline TOML document. No environment overrides are applied.
pub fn load_settings_from_str(toml: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Enforces the ranges the operator dashboard allows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bot = &self.bot;
        if bot.trade_amount_percent < Decimal::ONE || bot.trade_amount_percent > Decimal::from(50) {
            return Err(ConfigError::ValidationError(format!(
                "bot.trade_amount_percent must be between 1 and 50, got {}",
                bot.trade_amount_percent
            )));
        }
        if !(1..=25).contains(&bot.leverage) {
            return Err(ConfigError::ValidationError(format!(
                "bot.leverage must be between 1 and 25, got {}",
                bot.leverage
            )));
        }
        if bot.max_positions == 0 {
            return Err(ConfigError::ValidationError(
                "bot.max_positions must be at least 1".to_string(),
            ));
        }
        if self.engine.initial_balance.is_sign_negative() {
            return Err(ConfigError::ValidationError(format!(
                "engine.initial_balance cannot be negative, got {}",
                self.engine.initial_balance
            )));
        }
        if self.engine.tick_interval_ms == 0 || self.feed.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick and poll intervals must be greater than 0".to_string(),
            ));
        }
        if self.feed.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.symbols cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
