pub mod paper;
pub mod yobit;

pub use paper::PaperGateway;
pub use yobit::{
    CancelReceipt, Credentials, DepthResponse, ExchangeError, OrderReceipt, TradesResponse,
    YobitRestClient,
};

use crate::data::{PairId, Side};
use rust_decimal::Decimal;

/// Public market data: pair list, recent trades, order book depth
#[allow(async_fn_in_trait)]
pub trait MarketData {
    async fn list_pairs(&self) -> yobit::error::Result<Vec<PairId>>;

    /// Recent trades per pair, newest first
    async fn get_trades(&self, pairs: &[PairId], limit: usize)
        -> yobit::error::Result<TradesResponse>;

    async fn get_depth(&self, pairs: &[PairId], limit: usize)
        -> yobit::error::Result<DepthResponse>;
}

/// Private order entry.
///
/// Implementations must serialize calls made with one credential.
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    async fn place_order(
        &self,
        pair: &PairId,
        side: Side,
        rate: Decimal,
        amount: Decimal,
    ) -> yobit::error::Result<OrderReceipt>;

    async fn cancel_order(&self, order_id: u64) -> yobit::error::Result<CancelReceipt>;
}

impl<T: MarketData> MarketData for &T {
    async fn list_pairs(&self) -> yobit::error::Result<Vec<PairId>> {
        (**self).list_pairs().await
    }

    async fn get_trades(&self, pairs: &[PairId], limit: usize)
        -> yobit::error::Result<TradesResponse> {
        (**self).get_trades(pairs, limit).await
    }

    async fn get_depth(&self, pairs: &[PairId], limit: usize)
        -> yobit::error::Result<DepthResponse> {
        (**self).get_depth(pairs, limit).await
    }
}

impl<T: OrderGateway> OrderGateway for &T {
    async fn place_order(
        &self,
        pair: &PairId,
        side: Side,
        rate: Decimal,
        amount: Decimal,
    ) -> yobit::error::Result<OrderReceipt> {
        (**self).place_order(pair, side, rate, amount).await
    }

    async fn cancel_order(&self, order_id: u64) -> yobit::error::Result<CancelReceipt> {
        (**self).cancel_order(order_id).await
    }
}
