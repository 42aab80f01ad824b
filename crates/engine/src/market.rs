use core_types::{clamp_momentum, MarketPair, TickerUpdate, MOMENTUM_CEILING, MOMENTUM_FLOOR};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};

/// The latest quote of every tracked pair, plus the engine's momentum index.
///
/// Prices, 24h change and volume are replaced wholesale on every feed update.
/// The momentum index is carried across updates and nudged by the price delta.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshotStore {
    pairs: Vec<MarketPair>,
}

impl MarketSnapshotStore {
    /// Builds the store from seed data. Momentum readings are clamped into band
    /// and pairs without a positive price are dropped.
    pub fn new(seed: Vec<MarketPair>) -> Self {
        let mut seen = HashSet::new();
        let pairs = seed
            .into_iter()
            .filter(|pair| pair.price > Decimal::ZERO && seen.insert(pair.symbol.clone()))
            .map(|pair| MarketPair {
                momentum_index: clamp_momentum(pair.momentum_index),
                ..pair
            })
            .collect();
        Self { pairs }
    }

    /// Replaces the whole market with a fresh feed reading.
    ///
    /// Symbols absent from `tickers` are dropped and new ones start at a neutral
    /// momentum of 50. Order follows `tickers`; a repeated symbol keeps its first
    /// occurrence. Tickers without a positive price are ignored.
    pub fn replace(&mut self, tickers: Vec<TickerUpdate>) {
        let previous: HashMap<String, MarketPair> = std::mem::take(&mut self.pairs)
            .into_iter()
            .map(|pair| (pair.symbol.clone(), pair))
            .collect();

        let mut seen = HashSet::new();
        for ticker in tickers {
            if ticker.price <= Decimal::ZERO {
                tracing::warn!(symbol = %ticker.symbol, price = %ticker.price, "Ignoring ticker without a positive price.");
                continue;
            }
            if !seen.insert(ticker.symbol.clone()) {
                continue;
            }

            let mut pair = MarketPair::from_ticker(ticker);
            if let Some(old) = previous.get(&pair.symbol) {
                pair.momentum_index = next_momentum(old, pair.price);
            }
            self.pairs.push(pair);
        }
    }

    pub fn pairs(&self) -> &[MarketPair] {
        &self.pairs
    }

    pub fn get(&self, symbol: &str) -> Option<&MarketPair> {
        self.pairs.iter().find(|pair| pair.symbol == symbol)
    }

    pub fn price_of(&self, symbol: &str) -> Option<Decimal> {
        self.get(symbol).map(|pair| pair.price)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn next_momentum(old: &MarketPair, new_price: Decimal) -> Decimal {
    if old.price <= Decimal::ZERO {
        return old.momentum_index;
    }
    let shifted = (new_price - old.price)
        .checked_div(old.price)
        .and_then(|delta| delta.checked_mul(dec!(100)))
        .and_then(|points| points.checked_add(old.momentum_index));
    match shifted {
        Some(momentum) => clamp_momentum(momentum),
        // Too large to represent, so far outside the band either way.
        None if new_price > old.price => MOMENTUM_CEILING,
        None => MOMENTUM_FLOOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, price: Decimal) -> TickerUpdate {
        TickerUpdate {
            symbol: symbol.to_string(),
            price,
            change_24h: dec!(0.5),
            volume_24h: dec!(1000),
        }
    }

    fn pair(symbol: &str, price: Decimal, momentum: Decimal) -> MarketPair {
        MarketPair {
            symbol: symbol.to_string(),
            price,
            change_24h: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            momentum_index: momentum,
        }
    }

    #[test]
    fn new_symbols_start_neutral() {
        let mut store = MarketSnapshotStore::default();
        store.replace(vec![ticker("BTC_USDT", dec!(100))]);
        assert_eq!(store.get("BTC_USDT").unwrap().momentum_index, dec!(50));
    }

    #[test]
    fn momentum_follows_price_delta() {
        let mut store = MarketSnapshotStore::new(vec![pair("BTC_USDT", dec!(100), dec!(40))]);
        // +5% moves the index by 5 points.
        store.replace(vec![ticker("BTC_USDT", dec!(105))]);
        let btc = store.get("BTC_USDT").unwrap();
        assert_eq!(btc.momentum_index, dec!(45));
        assert_eq!(btc.price, dec!(105));
        assert_eq!(btc.change_24h, dec!(0.5));
    }

    #[test]
    fn momentum_is_clamped_on_large_moves() {
        let mut store = MarketSnapshotStore::new(vec![pair("ETH_USDT", dec!(100), dec!(85))]);
        store.replace(vec![ticker("ETH_USDT", dec!(200))]);
        assert_eq!(store.get("ETH_USDT").unwrap().momentum_index, MOMENTUM_CEILING);
        store.replace(vec![ticker("ETH_USDT", dec!(20))]);
        assert_eq!(store.get("ETH_USDT").unwrap().momentum_index, MOMENTUM_FLOOR);
    }

    #[test]
    fn extreme_price_jump_saturates_instead_of_overflowing() {
        let mut store = MarketSnapshotStore::new(vec![pair("X_USDT", dec!(0.0000000000000000000001), dec!(50))]);
        store.replace(vec![ticker("X_USDT", dec!(100000000))]);
        let x = store.get("X_USDT").unwrap();
        assert_eq!(x.momentum_index, MOMENTUM_CEILING);
        assert_eq!(x.price, dec!(100000000));

        store.replace(vec![ticker("X_USDT", dec!(0.0000000000000000000001))]);
        assert_eq!(store.get("X_USDT").unwrap().momentum_index, MOMENTUM_FLOOR);
    }

    #[test]
    fn seed_momentum_is_clamped() {
        let store = MarketSnapshotStore::new(vec![pair("SOL_USDT", dec!(10), dec!(99)), pair("ADA_USDT", dec!(1), dec!(0))]);
        assert_eq!(store.get("SOL_USDT").unwrap().momentum_index, MOMENTUM_CEILING);
        assert_eq!(store.get("ADA_USDT").unwrap().momentum_index, MOMENTUM_FLOOR);
    }

    #[test]
    fn missing_symbols_are_dropped_and_order_follows_input() {
        let mut store = MarketSnapshotStore::new(vec![
            pair("BTC_USDT", dec!(100), dec!(50)),
            pair("ETH_USDT", dec!(10), dec!(50)),
        ]);
        store.replace(vec![ticker("SOL_USDT", dec!(5)), ticker("BTC_USDT", dec!(100))]);
        let symbols: Vec<&str> = store.pairs().iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SOL_USDT", "BTC_USDT"]);
        assert!(store.price_of("ETH_USDT").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn non_positive_and_repeated_tickers_are_ignored() {
        let mut store = MarketSnapshotStore::default();
        store.replace(vec![
            ticker("BTC_USDT", Decimal::ZERO),
            ticker("ETH_USDT", dec!(10)),
            ticker("ETH_USDT", dec!(11)),
        ]);
        assert!(store.get("BTC_USDT").is_none());
        assert_eq!(store.price_of("ETH_USDT"), Some(dec!(10)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn momentum_stays_in_band_over_a_long_walk() {
        let mut store = MarketSnapshotStore::default();
        let mut price = dec!(100);
        for step in 0..500u32 {
            // Alternating bursts of large gains and losses.
            price = if (step / 25) % 2 == 0 { price * dec!(1.07) } else { price * dec!(0.91) };
            store.replace(vec![ticker("DOGE_USDT", price)]);
            let momentum = store.get("DOGE_USDT").unwrap().momentum_index;
            assert!(momentum >= MOMENTUM_FLOOR && momentum <= MOMENTUM_CEILING);
        }
        store.replace(Vec::new());
        assert!(store.is_empty());
    }
}
