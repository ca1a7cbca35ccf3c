pub mod execution;
pub mod signals;
pub mod trigger;

pub use execution::{Compensation, CompensationPolicy, PairedExecutor, PairedOutcome};
pub use signals::{compute_trade_stat, TradeStat};
pub use trigger::{Rejection, StrategyConfig, TradeProposal, TriggerEvaluator, TriggerMode};
