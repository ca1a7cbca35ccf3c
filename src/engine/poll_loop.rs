use std::future::Future;
use std::pin::pin;
use std::slice::Chunks;
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};

use crate::data::{Depth, PairId};
use crate::exchange::{MarketData, OrderGateway};
use crate::strategy::{
    compute_trade_stat, PairedExecutor, PairedOutcome, TradeProposal, TriggerEvaluator,
};
use crate::utils::config::PollingConfig;
use crate::utils::TraderMetrics;

/// Split the pair list into request-sized batches, preserving order
pub fn batches(pairs: &[PairId], batch_size: usize) -> Chunks<'_, PairId> {
    pairs.chunks(batch_size.max(1))
}

/// Counts for one full pass over all pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub pairs_listed: usize,
    pub list_failed: bool,
    pub batches: usize,
    pub batch_errors: usize,
    pub evaluated: usize,
    pub proposals: usize,
    pub completed: usize,
    pub failed: usize,
    pub one_legged: usize,
}

/// Current unix time in seconds
pub fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Drives fetch, evaluate, execute in a single sequential flow.
pub struct PollLoop<M, G> {
    market: M,
    executor: PairedExecutor<G>,
    evaluator: TriggerEvaluator,
    polling: PollingConfig,
    metrics: TraderMetrics,
    summary_every: u64,
    dry_run: bool,
    clock: fn() -> i64,
}

impl<M: MarketData, G: OrderGateway> PollLoop<M, G> {
    pub fn new(
        market: M,
        executor: PairedExecutor<G>,
        evaluator: TriggerEvaluator,
        polling: PollingConfig,
        metrics: TraderMetrics,
    ) -> Self {
        Self {
            market,
            executor,
            evaluator,
            polling,
            metrics,
            summary_every: 10,
            dry_run: false,
            clock: system_clock,
        }
    }

    /// Log proposals without sending any order
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_summary_every(mut self, cycles: u64) -> Self {
        self.summary_every = cycles;
        self
    }

    pub fn metrics(&self) -> &TraderMetrics {
        &self.metrics
    }

    pub fn executor(&self) -> &PairedExecutor<G> {
        &self.executor
    }

    /// Poll until Ctrl-C.
    ///
    /// The listener is installed before the first cycle, so an interrupt
    /// that lands mid-cycle still stops the loop once that cycle ends.
    pub async fn run_forever(&self) {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let listener = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = stop_tx.send(());
                }
                Err(e) => {
                    error!("Unable to listen for Ctrl-C: {}", e);
                    // Keep the sender alive so the loop is not stopped by a drop
                    std::future::pending::<()>().await;
                }
            }
        });

        self.run_until(async {
            let _ = stop_rx.await;
        })
        .await;
        listener.abort();
    }

    /// Poll until `shutdown` completes.
    ///
    /// Shutdown is only honoured between cycles, so a paired trade is
    /// never interrupted between its legs.
    pub async fn run_until<F: Future<Output = ()>>(&self, shutdown: F) {
        let delay = self.polling.check_delay();
        info!(
            "Polling every {:?} in batches of {}",
            delay, self.polling.batch_size
        );

        let mut shutdown = pin!(shutdown);
        loop {
            let report = self.run_cycle().await;
            debug!("Cycle finished: {:?}", report);

            let cycles = self.metrics.cycles.get();
            if self.summary_every > 0 && cycles % self.summary_every == 0 {
                self.metrics.log_summary();
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupt received, stopping");
                    self.metrics.log_summary();
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One pass: list pairs, then fetch and evaluate each batch in turn.
    ///
    /// A failed fetch is logged and skipped; it never ends the loop.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let pairs = match self.market.list_pairs().await {
            Ok(pairs) => pairs,
            Err(e) => {
                error!("Failed to fetch pair list: {}", e);
                self.metrics.fetch_errors.inc();
                self.metrics.cycles.inc();
                report.list_failed = true;
                return report;
            }
        };
        report.pairs_listed = pairs.len();
        self.metrics.last_pair_count.set(pairs.len() as i64);

        for batch in batches(&pairs, self.polling.batch_size) {
            report.batches += 1;
            self.process_batch(batch, &mut report).await;
        }

        self.metrics.cycles.inc();
        report
    }

    async fn process_batch(&self, batch: &[PairId], report: &mut CycleReport) {
        let trades = match self.market.get_trades(batch, self.polling.trades_limit).await {
            Ok(trades) => trades,
            Err(e) => {
                error!("Failed to fetch trades for {} pairs: {}", batch.len(), e);
                self.metrics.fetch_errors.inc();
                report.batch_errors += 1;
                return;
            }
        };

        let depth = match self.market.get_depth(batch, self.polling.depth_limit).await {
            Ok(depth) => depth,
            Err(e) => {
                error!("Failed to fetch depth for {} pairs: {}", batch.len(), e);
                self.metrics.fetch_errors.inc();
                report.batch_errors += 1;
                return;
            }
        };

        let now = (self.clock)();
        let lookback = self.evaluator.config().lookback_secs;
        let empty = Depth::default();

        for pair in batch {
            let Some(pair_trades) = trades.get(pair) else {
                trace!("{}: no trades in response", pair);
                continue;
            };

            let stat = compute_trade_stat(pair_trades, lookback, now);
            let pair_depth = depth.get(pair).unwrap_or(&empty);
            report.evaluated += 1;
            self.metrics.pairs_evaluated.inc();

            match self.evaluator.evaluate(pair, &stat, pair_depth) {
                Ok(proposal) => {
                    report.proposals += 1;
                    self.metrics.proposals.inc();
                    self.open_trade(&proposal, report).await;
                }
                Err(rejection) => trace!("{}: {}", pair, rejection),
            }
        }
    }

    async fn open_trade(&self, proposal: &TradeProposal, report: &mut CycleReport) {
        info!(
            "Open trade: {} volume {} buy {} sell {} profit {}",
            proposal.pair,
            proposal.volume,
            proposal.buy_price,
            proposal.sell_price,
            proposal.expected_profit
        );

        if self.dry_run {
            info!("Dry run: no orders sent for {}", proposal.pair);
            return;
        }

        let outcome = self.executor.execute(proposal).await;
        match &outcome {
            PairedOutcome::Completed { latency_ms, .. } => {
                info!("Paired trade on {} placed in {}ms", proposal.pair, latency_ms);
                report.completed += 1;
                self.metrics.paired_completed.inc();
            }
            PairedOutcome::BuyFailed(_) | PairedOutcome::SellFailed { .. } => {
                report.failed += 1;
                self.metrics.paired_failed.inc();
            }
        }

        if outcome.is_one_legged() {
            warn!("{} left with an unhedged buy: {:?}", proposal.pair, outcome);
            report.one_legged += 1;
            self.metrics.one_legged.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DepthLevel, Trade, TradeKind};
    use crate::exchange::yobit::error::Result;
    use crate::exchange::{DepthResponse, ExchangeError, PaperGateway, TradesResponse};
    use crate::strategy::{CompensationPolicy, StrategyConfig};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000;

    fn fixed_clock() -> i64 {
        NOW
    }

    fn pair_list(n: usize) -> Vec<PairId> {
        (0..n).map(|i| PairId::new(format!("c{:03}_btc", i))).collect()
    }

    /// In-memory market: every pair in `hot` gets a firing setup
    struct FakeMarket {
        pairs: Vec<PairId>,
        hot: HashSet<PairId>,
        fail_pairs: bool,
        fail_batch: Option<usize>,
        trade_requests: Mutex<Vec<Vec<PairId>>>,
        /// Fired from inside the first `list_pairs` call
        on_list: Mutex<Option<oneshot::Sender<()>>>,
    }

    impl FakeMarket {
        fn new(pairs: Vec<PairId>) -> Self {
            Self {
                pairs,
                hot: HashSet::new(),
                fail_pairs: false,
                fail_batch: None,
                trade_requests: Mutex::new(Vec::new()),
                on_list: Mutex::new(None),
            }
        }

        fn requests(&self) -> Vec<Vec<PairId>> {
            self.trade_requests.lock().unwrap().clone()
        }
    }

    impl MarketData for FakeMarket {
        async fn list_pairs(&self) -> Result<Vec<PairId>> {
            if let Some(stop) = self.on_list.lock().unwrap().take() {
                let _ = stop.send(());
            }
            if self.fail_pairs {
                return Err(ExchangeError::Protocol("bad info".into()));
            }
            Ok(self.pairs.clone())
        }

        async fn get_trades(&self, pairs: &[PairId], _limit: usize) -> Result<TradesResponse> {
            let mut requests = self.trade_requests.lock().unwrap();
            let index = requests.len();
            requests.push(pairs.to_vec());
            if self.fail_batch == Some(index) {
                return Err(ExchangeError::Exchange("Invalid pair name".into()));
            }

            Ok(pairs
                .iter()
                .map(|p| {
                    let kind = if self.hot.contains(p) {
                        TradeKind::Bid
                    } else {
                        TradeKind::Ask
                    };
                    let trades: Vec<Trade> = (0..20)
                        .map(|i| Trade {
                            kind,
                            price: None,
                            amount: dec!(0.1),
                            tid: None,
                            timestamp: NOW - i,
                        })
                        .collect();
                    (p.clone(), trades)
                })
                .collect())
        }

        async fn get_depth(&self, pairs: &[PairId], _limit: usize) -> Result<DepthResponse> {
            Ok(pairs
                .iter()
                .map(|p| {
                    let depth = Depth {
                        asks: vec![
                            DepthLevel::new(dec!(0.0001), dec!(0.5)),
                            DepthLevel::new(dec!(0.00011), dec!(2.0)),
                        ],
                        bids: vec![],
                    };
                    (p.clone(), depth)
                })
                .collect())
        }
    }

    fn poll_loop(market: FakeMarket) -> PollLoop<FakeMarket, PaperGateway> {
        PollLoop::new(
            market,
            PairedExecutor::new(PaperGateway::new(), CompensationPolicy::CancelBuy),
            TriggerEvaluator::new(StrategyConfig::default()),
            PollingConfig::default(),
            TraderMetrics::new().unwrap(),
        )
        .with_clock(fixed_clock)
    }

    #[test]
    fn test_batches_120_by_50() {
        let pairs = pair_list(120);
        let sizes: Vec<usize> = batches(&pairs, 50).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
    }

    #[test]
    fn test_batches_empty() {
        assert_eq!(batches(&[], 50).count(), 0);
    }

    proptest! {
        #[test]
        fn prop_batches_cover_every_pair_in_order(n in 0usize..400, size in 1usize..80) {
            let pairs = pair_list(n);
            let chunks: Vec<&[PairId]> = batches(&pairs, size).collect();

            prop_assert_eq!(chunks.len(), (n + size - 1) / size);
            prop_assert!(chunks.iter().all(|c| c.len() <= size && !c.is_empty()));

            let flattened: Vec<PairId> = chunks.concat();
            prop_assert_eq!(flattened, pairs);
        }
    }

    #[tokio::test]
    async fn test_cycle_requests_batches_in_order() {
        let pairs = pair_list(120);
        let engine = poll_loop(FakeMarket::new(pairs.clone()));

        let report = engine.run_cycle().await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.evaluated, 120);
        assert_eq!(report.proposals, 0);

        let requests = engine.market.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], pairs[..50].to_vec());
        assert_eq!(requests[2], pairs[100..].to_vec());
    }

    #[tokio::test]
    async fn test_hot_pair_triggers_paired_trade() {
        let pairs = pair_list(10);
        let mut market = FakeMarket::new(pairs.clone());
        market.hot.insert(pairs[3].clone());
        let engine = poll_loop(market);

        let report = engine.run_cycle().await;

        assert_eq!(report.proposals, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(engine.executor().gateway().orders_sent(), 2);
        assert_eq!(engine.metrics().paired_completed.get(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let pairs = pair_list(10);
        let mut market = FakeMarket::new(pairs.clone());
        market.hot.insert(pairs[0].clone());
        let engine = poll_loop(market).with_dry_run(true);

        let report = engine.run_cycle().await;

        assert_eq!(report.proposals, 1);
        assert_eq!(report.completed, 0);
        assert_eq!(engine.executor().gateway().orders_sent(), 0);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_cycle() {
        let mut market = FakeMarket::new(pair_list(120));
        market.fail_batch = Some(1);
        let engine = poll_loop(market);

        let report = engine.run_cycle().await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.batch_errors, 1);
        assert_eq!(report.evaluated, 70);
        assert_eq!(engine.metrics().fetch_errors.get(), 1);
    }

    #[tokio::test]
    async fn test_pair_list_failure_is_reported() {
        let mut market = FakeMarket::new(pair_list(5));
        market.fail_pairs = true;
        let engine = poll_loop(market);

        let report = engine.run_cycle().await;

        assert!(report.list_failed);
        assert_eq!(report.batches, 0);
        assert_eq!(engine.metrics().cycles.get(), 1);
    }

    #[tokio::test]
    async fn test_stop_during_cycle_ends_loop_after_that_cycle() {
        let (stop_tx, stop_rx) = oneshot::channel();
        let market = FakeMarket::new(pair_list(120));
        *market.on_list.lock().unwrap() = Some(stop_tx);

        let polling = PollingConfig {
            check_delay_secs: 0.1,
            ..PollingConfig::default()
        };
        let engine = PollLoop::new(
            market,
            PairedExecutor::new(PaperGateway::new(), CompensationPolicy::CancelBuy),
            TriggerEvaluator::new(StrategyConfig::default()),
            polling,
            TraderMetrics::new().unwrap(),
        )
        .with_clock(fixed_clock);

        let stopped = tokio::time::timeout(
            Duration::from_secs(3),
            engine.run_until(async {
                let _ = stop_rx.await;
            }),
        )
        .await;

        assert!(stopped.is_ok(), "loop kept polling after a stop request");
        assert_eq!(engine.metrics().cycles.get(), 1);
        // The cycle in flight still ran to completion
        assert_eq!(engine.metrics().pairs_evaluated.get(), 120);
    }
}
