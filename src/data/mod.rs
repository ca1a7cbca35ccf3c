pub mod types;

pub use types::{Depth, DepthLevel, PairId, Side, Trade, TradeKind};
