use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::data::{PairId, Side};
use crate::exchange::yobit::error::Result;
use crate::exchange::{CancelReceipt, OrderGateway, OrderReceipt};

/// Order gateway that never touches the exchange.
///
/// Every order is reported as filled in full; nothing rests on a book.
#[derive(Debug, Default)]
pub struct PaperGateway {
    orders_sent: AtomicUsize,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders_sent(&self) -> usize {
        self.orders_sent.load(Ordering::Relaxed)
    }
}

impl OrderGateway for PaperGateway {
    async fn place_order(
        &self,
        pair: &PairId,
        side: Side,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<OrderReceipt> {
        self.orders_sent.fetch_add(1, Ordering::Relaxed);
        info!("[paper] {} {} {} @ {}", side, amount, pair, rate);

        Ok(OrderReceipt {
            received: amount,
            remains: Decimal::ZERO,
            order_id: 0,
            funds: HashMap::new(),
        })
    }

    async fn cancel_order(&self, order_id: u64) -> Result<CancelReceipt> {
        info!("[paper] cancel {}", order_id);

        Ok(CancelReceipt {
            order_id,
            funds: HashMap::new(),
        })
    }
}
