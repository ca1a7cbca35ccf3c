pub mod flow;

pub use flow::{compute_trade_stat, TradeStat};
