use crate::data::Trade;
use rust_decimal::Decimal;

/// Trade-flow statistics for one pair, recomputed every poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStat {
    /// Trades tagged `bid` (taker buys)
    pub buy_count: usize,
    pub buy_volume: Decimal,
    /// Mean `bid` amount, zero when there are no bids
    pub mean_volume: Decimal,
    /// Oldest trade in the window is younger than the lookback
    pub is_buy_recent: bool,
    /// Trades tagged `ask` (taker sells)
    pub sell_count: usize,
}

impl TradeStat {
    /// Trades counted in either bucket
    pub fn tagged_count(&self) -> usize {
        self.buy_count + self.sell_count
    }
}

/// Compute flow statistics over a trade window.
///
/// `trades` must be newest-first, the order the `trades` endpoint
/// returns them. The last element is therefore the oldest trade, and
/// `is_buy_recent` holds only when that trade is strictly newer than
/// `now - lookback_secs`. An empty window is never recent.
///
/// Trades with an unrecognized tag count toward neither side.
pub fn compute_trade_stat(trades: &[Trade], lookback_secs: i64, now: i64) -> TradeStat {
    let mut buy_count = 0usize;
    let mut sell_count = 0usize;
    let mut buy_volume = Decimal::ZERO;

    for trade in trades {
        if trade.is_bid() {
            buy_count += 1;
            buy_volume += trade.amount;
        } else if trade.is_ask() {
            sell_count += 1;
        }
    }

    let mean_volume = if buy_count > 0 {
        buy_volume / Decimal::from(buy_count)
    } else {
        Decimal::ZERO
    };

    let is_buy_recent = trades
        .last()
        .map(|oldest| oldest.timestamp > now - lookback_secs)
        .unwrap_or(false);

    TradeStat {
        buy_count,
        buy_volume,
        mean_volume,
        is_buy_recent,
        sell_count,
    }
}
