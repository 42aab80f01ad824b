use serde::Deserialize;

/// One entry of `GET /spot/tickers`. Gate.io quotes every number as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct GateTicker {
    pub currency_pair: String,
    pub last: String,
    #[serde(default)]
    pub change_percentage: String,
    #[serde(default)]
    pub base_volume: String,
    // There are more fields (bid/ask, quote volume, highs and lows), unused here.
}

/// The error body Gate.io returns alongside a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct GateErrorResponse {
    pub label: String,
    pub message: String,
}
