use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Depth, PairId};
use crate::strategy::signals::TradeStat;

/// How `buy_count` is compared against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// `buy_count == target`; a window with more buys never fires
    Exactly,
    /// `buy_count >= target`
    AtLeast,
}

impl TriggerMode {
    pub fn admits(&self, buy_count: usize, target: usize) -> bool {
        match self {
            TriggerMode::Exactly => buy_count == target,
            TriggerMode::AtLeast => buy_count >= target,
        }
    }
}

/// Decision parameters, passed explicitly so tests can override any of them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Window within which the oldest trade must fall
    pub lookback_secs: i64,
    pub buy_count_target: usize,
    pub trigger_mode: TriggerMode,
    /// Best ask volume must not exceed `mean_volume * multiplier`
    pub mean_volume_multiplier: Decimal,
    /// Notional cap per trade, in quote currency
    pub max_trade_btc: Decimal,
    pub quote_suffix: String,
    /// Decimal places kept in the order amount (truncated)
    pub volume_precision: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            lookback_secs: 300,
            buy_count_target: 20,
            trigger_mode: TriggerMode::Exactly,
            mean_volume_multiplier: dec!(10),
            max_trade_btc: dec!(0.0005),
            quote_suffix: "_btc".to_string(),
            volume_precision: 8,
        }
    }
}

/// A paired buy at the best ask and sell at the next ask
#[derive(Debug, Clone, PartialEq)]
pub struct TradeProposal {
    pub pair: PairId,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub volume: Decimal,
    /// Reporting only; never gates the decision
    pub expected_profit: Decimal,
}

impl TradeProposal {
    pub fn notional(&self) -> Decimal {
        self.buy_price * self.volume
    }
}

/// Why a pair did not trigger, in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    BuyCountMismatch { buy_count: usize, target: usize },
    StaleWindow,
    InsufficientDepth { ask_levels: usize },
    /// Best ask holds more than the recent mean buy could absorb
    AskTooDeep { ask_volume: Decimal, capacity: Decimal },
    /// Next level is no larger than the best one
    NoAskStep { ask_volume: Decimal, next_ask_volume: Decimal },
    NonPositivePrice { ask_price: Decimal },
    ZeroVolume,
    WrongQuote { suffix: String },
    NotionalCap { notional: Decimal, cap: Decimal },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::BuyCountMismatch { buy_count, target } => {
                write!(f, "buy count {} vs target {}", buy_count, target)
            }
            Rejection::StaleWindow => write!(f, "oldest trade outside lookback"),
            Rejection::InsufficientDepth { ask_levels } => {
                write!(f, "only {} ask levels", ask_levels)
            }
            Rejection::AskTooDeep { ask_volume, capacity } => {
                write!(f, "ask volume {} above capacity {}", ask_volume, capacity)
            }
            Rejection::NoAskStep { ask_volume, next_ask_volume } => {
                write!(f, "ask volume {} not below next {}", ask_volume, next_ask_volume)
            }
            Rejection::NonPositivePrice { ask_price } => write!(f, "ask price {}", ask_price),
            Rejection::ZeroVolume => write!(f, "trade volume rounds to zero"),
            Rejection::WrongQuote { suffix } => write!(f, "pair not quoted in {}", suffix),
            Rejection::NotionalCap { notional, cap } => {
                write!(f, "notional {} exceeds cap {}", notional, cap)
            }
        }
    }
}

/// Turns a pair's flow statistics and depth into a trade decision.
///
/// Pure: no state carries between pairs or cycles.
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    config: StrategyConfig,
}

impl TriggerEvaluator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Propose a paired trade iff every condition holds
    pub fn evaluate(
        &self,
        pair: &PairId,
        stat: &TradeStat,
        depth: &Depth,
    ) -> Result<TradeProposal, Rejection> {
        let cfg = &self.config;

        if !cfg.trigger_mode.admits(stat.buy_count, cfg.buy_count_target) {
            return Err(Rejection::BuyCountMismatch {
                buy_count: stat.buy_count,
                target: cfg.buy_count_target,
            });
        }

        if !stat.is_buy_recent {
            return Err(Rejection::StaleWindow);
        }

        let (best, next) = depth.best_two_asks().ok_or(Rejection::InsufficientDepth {
            ask_levels: depth.asks.len(),
        })?;
        let (ask_price, ask_volume) = (best.price(), best.volume());
        let (next_ask_price, next_ask_volume) = (next.price(), next.volume());

        let capacity = stat.mean_volume * cfg.mean_volume_multiplier;
        if capacity < ask_volume {
            return Err(Rejection::AskTooDeep { ask_volume, capacity });
        }
        if ask_volume >= next_ask_volume {
            return Err(Rejection::NoAskStep {
                ask_volume,
                next_ask_volume,
            });
        }

        let volume = self.trade_volume(ask_price, ask_volume)?;
        if volume.is_zero() {
            return Err(Rejection::ZeroVolume);
        }

        if !pair.is_quoted_in(&cfg.quote_suffix) {
            return Err(Rejection::WrongQuote {
                suffix: cfg.quote_suffix.clone(),
            });
        }

        self.check_notional(ask_price, volume)?;

        Ok(TradeProposal {
            pair: pair.clone(),
            buy_price: ask_price,
            sell_price: next_ask_price,
            volume,
            expected_profit: (next_ask_price - ask_price) * volume,
        })
    }

    /// Reject when `price * volume` exceeds the per-trade cap
    pub fn check_notional(&self, price: Decimal, volume: Decimal) -> Result<Decimal, Rejection> {
        let notional = price * volume;
        if notional > self.config.max_trade_btc {
            return Err(Rejection::NotionalCap {
                notional,
                cap: self.config.max_trade_btc,
            });
        }
        Ok(notional)
    }

    /// `min(ask_volume, max_trade_btc / ask_price)`, truncated to the
    /// configured amount precision.
    ///
    /// Truncation makes `10^-volume_precision` the smallest volume that
    /// survives the nonzero check.
    pub fn trade_volume(&self, ask_price: Decimal, ask_volume: Decimal) -> Result<Decimal, Rejection> {
        if ask_price <= Decimal::ZERO {
            return Err(Rejection::NonPositivePrice { ask_price });
        }

        let affordable = self
            .config
            .max_trade_btc
            .checked_div(ask_price)
            .unwrap_or(Decimal::MAX);

        Ok(ask_volume
            .min(affordable)
            .round_dp_with_strategy(self.config.volume_precision, RoundingStrategy::ToZero))
    }
}
