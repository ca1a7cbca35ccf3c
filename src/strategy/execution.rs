use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::data::Side;
use crate::exchange::{CancelReceipt, ExchangeError, OrderGateway, OrderReceipt};
use crate::strategy::TradeProposal;

/// What to do with the buy leg when the sell leg fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationPolicy {
    /// Leave the buy in place and report the broken pair
    None,
    /// Cancel whatever part of the buy still rests on the book
    CancelBuy,
}

/// Fate of the buy leg after a failed sell
#[derive(Debug)]
pub enum Compensation {
    NotAttempted,
    /// Buy filled immediately, nothing left to cancel
    NothingToCancel,
    Cancelled(CancelReceipt),
    CancelFailed(ExchangeError),
}

/// Result of placing one paired trade
#[derive(Debug)]
pub enum PairedOutcome {
    Completed {
        buy: OrderReceipt,
        sell: OrderReceipt,
        latency_ms: u64,
    },
    /// Nothing was placed
    BuyFailed(ExchangeError),
    /// Buy placed, sell failed: the position is one-legged
    /// unless compensation succeeded
    SellFailed {
        buy: OrderReceipt,
        error: ExchangeError,
        compensation: Compensation,
    },
}

impl PairedOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PairedOutcome::Completed { .. })
    }

    /// True when a buy may be left on the book or in the wallet unhedged.
    ///
    /// A cancel only removes the resting part; anything already received
    /// stays held without a matching sell.
    pub fn is_one_legged(&self) -> bool {
        match self {
            PairedOutcome::SellFailed { buy, compensation, .. } => match compensation {
                Compensation::Cancelled(_) | Compensation::NothingToCancel => {
                    !buy.received.is_zero()
                }
                _ => true,
            },
            _ => false,
        }
    }
}

/// Places a proposal as buy-then-sell through one order gateway.
///
/// The two legs are separate exchange calls; atomicity is not available,
/// so a failed sell is surfaced as its own outcome and compensated per
/// policy.
pub struct PairedExecutor<G> {
    gateway: G,
    policy: CompensationPolicy,
}

impl<G: OrderGateway> PairedExecutor<G> {
    pub fn new(gateway: G, policy: CompensationPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> CompensationPolicy {
        self.policy
    }

    /// Execute a trade proposal
    pub async fn execute(&self, proposal: &TradeProposal) -> PairedOutcome {
        let started = Instant::now();

        let buy = match self
            .gateway
            .place_order(&proposal.pair, Side::Buy, proposal.buy_price, proposal.volume)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                error!("BUY {} failed: {}", proposal.pair, e);
                return PairedOutcome::BuyFailed(e);
            }
        };
        info!("BUY: {:?}", buy);

        match self
            .gateway
            .place_order(&proposal.pair, Side::Sell, proposal.sell_price, proposal.volume)
            .await
        {
            Ok(sell) => {
                info!("SELL: {:?}", sell);
                PairedOutcome::Completed {
                    buy,
                    sell,
                    latency_ms: started.elapsed().as_millis() as u64,
                }
            }
            Err(e) => {
                error!("SELL {} failed after buy was placed: {}", proposal.pair, e);
                let compensation = self.compensate(&buy).await;
                PairedOutcome::SellFailed {
                    buy,
                    error: e,
                    compensation,
                }
            }
        }
    }

    async fn compensate(&self, buy: &OrderReceipt) -> Compensation {
        match self.policy {
            CompensationPolicy::None => {
                warn!("Compensation disabled; buy leg left as is");
                Compensation::NotAttempted
            }
            CompensationPolicy::CancelBuy if !buy.is_resting() => {
                warn!("Buy filled in full ({}); nothing to cancel", buy.received);
                Compensation::NothingToCancel
            }
            CompensationPolicy::CancelBuy => match self.gateway.cancel_order(buy.order_id).await {
                Ok(receipt) => {
                    info!("Cancelled buy order {}", receipt.order_id);
                    Compensation::Cancelled(receipt)
                }
                Err(e) => {
                    error!("Cancel of buy order {} failed: {}", buy.order_id, e);
                    Compensation::CancelFailed(e)
                }
            },
        }
    }
}
