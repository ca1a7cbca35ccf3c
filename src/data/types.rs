use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side as the private API spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade tag from the public trades feed.
///
/// `bid` is a taker buy, `ask` a taker sell. Anything else lands in
/// `Unknown` and is ignored by the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Bid,
    Ask,
    #[serde(other)]
    Unknown,
}

/// Public trade record, as returned by the `trades` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub kind: TradeKind,

    #[serde(default)]
    pub price: Option<Decimal>,

    pub amount: Decimal,

    #[serde(default)]
    pub tid: Option<u64>,

    /// Unix seconds
    pub timestamp: i64,
}

impl Trade {
    pub fn is_bid(&self) -> bool {
        self.kind == TradeKind::Bid
    }

    pub fn is_ask(&self) -> bool {
        self.kind == TradeKind::Ask
    }
}

/// One order book level: `[price, volume]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel(pub Decimal, pub Decimal);

impl DepthLevel {
    pub fn new(price: Decimal, volume: Decimal) -> Self {
        Self(price, volume)
    }

    pub fn price(&self) -> Decimal {
        self.0
    }

    pub fn volume(&self) -> Decimal {
        self.1
    }
}

/// Order book snapshot for one pair.
///
/// Asks ascend by price, bids descend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    #[serde(default)]
    pub asks: Vec<DepthLevel>,
    #[serde(default)]
    pub bids: Vec<DepthLevel>,
}

impl Depth {
    /// Best and second-best ask, if the book has two levels
    pub fn best_two_asks(&self) -> Option<(DepthLevel, DepthLevel)> {
        match self.asks.as_slice() {
            [best, next, ..] => Some((*best, *next)),
            _ => None,
        }
    }
}

/// Exchange-defined market identifier such as `ltc_btc`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(String);

impl PairId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the pair ends with the quote-currency suffix, e.g. `_btc`
    pub fn is_quoted_in(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PairId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
