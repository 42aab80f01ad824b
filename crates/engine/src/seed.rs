use core_types::{clamp_momentum, MarketPair};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Reference price of a base asset, used to make seeded markets look plausible.
pub fn base_price(symbol: &str) -> Option<Decimal> {
    let base = symbol.split('_').next().unwrap_or(symbol);
    let price = match base {
        "BTC" => dec!(96500),
        "ETH" => dec!(3650),
        "SOL" => dec!(240),
        "XRP" => dec!(2.50),
        "ADA" => dec!(1.10),
        "DOGE" => dec!(0.42),
        "AVAX" => dec!(45),
        "DOT" => dec!(8.50),
        "TRX" => dec!(0.25),
        "LTC" => dec!(110),
        "LINK" => dec!(18),
        "BCH" => dec!(450),
        "SHIB" => dec!(0.000025),
        _ => return None,
    };
    Some(price)
}

/// Builds a plausible starting market for `symbols`.
///
/// Known assets sit within ±2% of their reference price, unknown ones get a
/// generic price in `[10, 60)`. The 24h change is drawn from `[-7.5, 7.5)`,
/// volume from `[0, 1e8)` and the momentum index from `[30, 70)`.
pub fn seed_market<R: Rng + ?Sized>(symbols: &[String], rng: &mut R) -> Vec<MarketPair> {
    symbols
        .iter()
        .map(|symbol| {
            let reference = base_price(symbol).unwrap_or_else(|| decimal(rng.gen_range(10.0..60.0)));
            let jitter = decimal(rng.gen_range(0.98..1.02));
            MarketPair {
                symbol: symbol.clone(),
                price: (reference * jitter).round_dp(10),
                change_24h: decimal(rng.gen_range(-7.5..7.5)).round_dp(2),
                volume_24h: decimal(rng.gen_range(0.0..100_000_000.0)).round_dp(0),
                momentum_index: clamp_momentum(decimal(rng.gen_range(30.0..70.0)).round_dp(2)),
            }
        })
        .collect()
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}
