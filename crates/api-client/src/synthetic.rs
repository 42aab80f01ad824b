use crate::error::ApiError;
use crate::PriceFeed;
use async_trait::async_trait;
use core_types::{MarketPair, TickerUpdate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Largest single-step move, in percent, of the default walk.
pub const DEFAULT_MAX_STEP_PCT: f64 = 1.5;

/// An offline feed: every fetch moves each known price by a uniform step of at
/// most `max_step_pct` percent and lets the 24h change and volume drift.
pub struct SyntheticFeed {
    max_step_pct: f64,
    state: Mutex<WalkState>,
}

struct WalkState {
    rng: StdRng,
    quotes: HashMap<String, TickerUpdate>,
}

impl SyntheticFeed {
    /// Starts the walk from the given market. Entropy-seeded when `seed` is `None`.
    pub fn from_market(market: &[MarketPair], seed: Option<u64>) -> Self {
        Self::with_step(market, seed, DEFAULT_MAX_STEP_PCT)
    }

    pub fn with_step(market: &[MarketPair], seed: Option<u64>, max_step_pct: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let quotes = market
            .iter()
            .map(|pair| {
                let quote = TickerUpdate {
                    symbol: pair.symbol.clone(),
                    price: pair.price,
                    change_24h: pair.change_24h,
                    volume_24h: pair.volume_24h,
                };
                (pair.symbol.clone(), quote)
            })
            .collect();
        Self {
            max_step_pct: max_step_pct.abs(),
            state: Mutex::new(WalkState { rng, quotes }),
        }
    }
}

#[async_trait]
impl PriceFeed for SyntheticFeed {
    async fn fetch_tickers(&self, universe: &[String]) -> Result<Vec<TickerUpdate>, ApiError> {
        let mut state = self.state.lock().await;
        let WalkState { rng, quotes } = &mut *state;

        let mut updates = Vec::with_capacity(universe.len());
        for symbol in universe {
            let Some(quote) = quotes.get_mut(symbol) else {
                tracing::debug!(%symbol, "Synthetic feed has no quote for symbol.");
                continue;
            };
            step(quote, rng, self.max_step_pct);
            updates.push(quote.clone());
        }
        Ok(updates)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

fn step<R: Rng + ?Sized>(quote: &mut TickerUpdate, rng: &mut R, max_step_pct: f64) {
    let move_pct = if max_step_pct > 0.0 {
        rng.gen_range(-max_step_pct..=max_step_pct)
    } else {
        0.0
    };
    let factor = Decimal::ONE + decimal(move_pct) / dec!(100);
    let next = (quote.price * factor).round_dp(10);
    if next > Decimal::ZERO {
        quote.price = next;
    }

    let drift = decimal(rng.gen_range(-0.5..=0.5));
    quote.change_24h = (quote.change_24h + drift).max(dec!(-25)).min(dec!(25)).round_dp(2);

    let volume_factor = decimal(rng.gen_range(0.95..=1.05));
    quote.volume_24h = (quote.volume_24h * volume_factor).round_dp(0);
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> Vec<MarketPair> {
        [("BTC_USDT", dec!(96500)), ("SHIB_USDT", dec!(0.000025))]
            .into_iter()
            .map(|(symbol, price)| MarketPair {
                symbol: symbol.to_string(),
                price,
                change_24h: dec!(1.5),
                volume_24h: dec!(1000000),
                momentum_index: dec!(50),
            })
            .collect()
    }

    fn universe() -> Vec<String> {
        vec!["BTC_USDT".to_string(), "DOGE_USDT".to_string(), "SHIB_USDT".to_string()]
    }

    #[tokio::test]
    async fn steps_are_bounded_and_prices_stay_positive() {
        let feed = SyntheticFeed::from_market(&market(), Some(9));
        let mut last = dec!(96500);
        for _ in 0..500 {
            let updates = feed.fetch_tickers(&universe()).await.unwrap();
            assert_eq!(updates.len(), 2);
            let btc = &updates[0];
            let ratio = btc.price / last;
            assert!(ratio >= dec!(0.98499) && ratio <= dec!(1.01501), "ratio = {}", ratio);
            last = btc.price;
            for update in &updates {
                assert!(update.price > Decimal::ZERO);
                assert!(update.change_24h >= dec!(-25) && update.change_24h <= dec!(25));
            }
        }
    }

    #[tokio::test]
    async fn same_seed_same_walk() {
        let a = SyntheticFeed::from_market(&market(), Some(4));
        let b = SyntheticFeed::from_market(&market(), Some(4));
        for _ in 0..20 {
            assert_eq!(a.fetch_tickers(&universe()).await.unwrap(), b.fetch_tickers(&universe()).await.unwrap());
        }
    }

    #[tokio::test]
    async fn zero_step_only_drifts_change_and_volume() {
        let feed = SyntheticFeed::with_step(&market(), Some(1), 0.0);
        let updates = feed.fetch_tickers(&universe()).await.unwrap();
        assert_eq!(updates[0].price, dec!(96500));
        assert_eq!(feed.name(), "synthetic");
    }
}
