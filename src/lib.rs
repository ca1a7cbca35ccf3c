pub mod data;
pub mod engine;
pub mod exchange;
pub mod strategy;
pub mod utils;

// Re-export commonly used types
pub use data::{Depth, DepthLevel, PairId, Side, Trade, TradeKind};
pub use engine::{batches, CycleReport, PollLoop};
pub use exchange::{
    Credentials, ExchangeError, MarketData, OrderGateway, PaperGateway, YobitRestClient,
};
pub use strategy::{
    compute_trade_stat, CompensationPolicy, PairedExecutor, PairedOutcome, Rejection,
    StrategyConfig, TradeProposal, TradeStat, TriggerEvaluator, TriggerMode,
};
pub use utils::{Config, TraderMetrics};
