use crate::error::ApiError;
use async_trait::async_trait;
use configuration::{FeedSettings, FeedSource};
use core_types::{MarketPair, TickerUpdate};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

pub mod error;
pub mod responses;
pub mod synthetic;
// --- Public API ---
pub use responses::{GateErrorResponse, GateTicker};
pub use synthetic::SyntheticFeed;

/// The generic, abstract interface for a source of market quotes.
/// The runner polls it on its own cadence and hands the result to the engine,
/// so a live or an offline implementation can be swapped in freely.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetches the latest quote of every symbol in `universe` the source knows.
    /// Symbols it cannot quote are simply absent from the result.
    async fn fetch_tickers(&self, universe: &[String]) -> Result<Vec<TickerUpdate>, ApiError>;

    /// Short label used in logs and status lines.
    fn name(&self) -> &'static str;
}

/// Reads the public, unauthenticated Gate.io spot ticker endpoint.
#[derive(Clone)]
pub struct GateTickerClient {
    client: reqwest::Client,
    base_url: String,
}

impl GateTickerClient {
    pub fn new(settings: &FeedSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceFeed for GateTickerClient {
    async fn fetch_tickers(&self, universe: &[String]) -> Result<Vec<TickerUpdate>, ApiError> {
        let url = format!("{}/spot/tickers", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<GateErrorResponse>(&text) {
                Ok(body) => ApiError::ApiError(format!("{} {}: {}", status, body.label, body.message)),
                Err(_) => ApiError::ApiError(format!("{}: {}", status, text)),
            });
        }

        let tickers: Vec<GateTicker> =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(map_tickers(tickers, universe))
    }

    fn name(&self) -> &'static str {
        "gate.io"
    }
}

/// Keeps the tickers of `universe`, in response order, converted to engine readings.
/// Entries with unparsable numbers or without a positive price are dropped.
pub fn map_tickers(tickers: Vec<GateTicker>, universe: &[String]) -> Vec<TickerUpdate> {
    let wanted: HashSet<&str> = universe.iter().map(String::as_str).collect();

    tickers
        .into_iter()
        .filter(|raw| wanted.contains(raw.currency_pair.as_str()))
        .filter_map(|raw| match to_update(&raw) {
            Ok(update) => Some(update),
            Err(e) => {
                tracing::warn!(symbol = %raw.currency_pair, error = %e, "Skipping malformed ticker.");
                None
            }
        })
        .collect()
}

fn to_update(raw: &GateTicker) -> Result<TickerUpdate, ApiError> {
    let price = parse_decimal("last", &raw.last)?;
    if price <= Decimal::ZERO {
        return Err(ApiError::InvalidData(format!("non-positive price {}", price)));
    }
    Ok(TickerUpdate {
        symbol: raw.currency_pair.clone(),
        price,
        change_24h: parse_decimal("change_percentage", &raw.change_percentage)?,
        volume_24h: parse_decimal("base_volume", &raw.base_volume)?,
    })
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| ApiError::InvalidData(format!("{} = {:?}: {}", field, value, e)))
}

/// Builds the feed selected in the settings. The synthetic walk starts from
/// `seed_market` and is reproducible when `seed` is set.
pub fn create_feed(
    settings: &FeedSettings,
    seed_market: &[MarketPair],
    seed: Option<u64>,
) -> Result<Box<dyn PriceFeed>, ApiError> {
    match settings.source {
        FeedSource::Gate => Ok(Box::new(GateTickerClient::new(settings)?)),
        FeedSource::Synthetic => Ok(Box::new(SyntheticFeed::from_market(seed_market, seed))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"[
        {"currency_pair":"BTC_USDT","last":"96512.3","lowest_ask":"96512.4","highest_bid":"96512.3","change_percentage":"-1.52","base_volume":"8123.44","quote_volume":"783992211.1","high_24h":"98000","low_24h":"95000"},
        {"currency_pair":"PEPE_USDT","last":"0.0000123","change_percentage":"4.1","base_volume":"1"},
        {"currency_pair":"SHIB_USDT","last":"2.5e-5","change_percentage":"0.7","base_volume":"991200300400"},
        {"currency_pair":"ETH_USDT","last":"","change_percentage":"1","base_volume":"1"},
        {"currency_pair":"SOL_USDT","last":"0","change_percentage":"1","base_volume":"1"},
        {"currency_pair":"XRP_USDT","last":"2.51","change_percentage":"n/a","base_volume":"1"}
    ]"#;

    fn universe() -> Vec<String> {
        ["BTC_USDT", "ETH_USDT", "SOL_USDT", "SHIB_USDT", "XRP_USDT"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn maps_only_well_formed_universe_tickers() {
        let raw: Vec<GateTicker> = serde_json::from_str(FIXTURE).unwrap();
        let updates = map_tickers(raw, &universe());

        let symbols: Vec<&str> = updates.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC_USDT", "SHIB_USDT"]);

        let btc = &updates[0];
        assert_eq!(btc.price, dec!(96512.3));
        assert_eq!(btc.change_24h, dec!(-1.52));
        assert_eq!(btc.volume_24h, dec!(8123.44));
        assert_eq!(updates[1].price, dec!(0.000025));
    }

    #[test]
    fn missing_optional_fields_make_the_entry_unusable() {
        let raw: Vec<GateTicker> =
            serde_json::from_str(r#"[{"currency_pair":"BTC_USDT","last":"100"}]"#).unwrap();
        assert!(map_tickers(raw, &universe()).is_empty());
    }

    #[test]
    fn error_body_deserializes() {
        let body: GateErrorResponse =
            serde_json::from_str(r#"{"label":"TOO_MANY_REQUESTS","message":"Request Rate limit Exceeded"}"#).unwrap();
        assert_eq!(body.label, "TOO_MANY_REQUESTS");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let settings = FeedSettings {
            base_url: "https://api.gateio.ws/api/v4/".to_string(),
            ..FeedSettings::default()
        };
        let client = GateTickerClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "https://api.gateio.ws/api/v4");
        assert_eq!(client.name(), "gate.io");
    }

    #[test]
    fn factory_honours_the_configured_source() {
        let synthetic = FeedSettings {
            source: FeedSource::Synthetic,
            ..FeedSettings::default()
        };
        assert_eq!(create_feed(&synthetic, &[], Some(1)).unwrap().name(), "synthetic");
        assert_eq!(create_feed(&FeedSettings::default(), &[], None).unwrap().name(), "gate.io");
    }
}
