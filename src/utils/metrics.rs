use prometheus::{IntCounter, IntGauge, Registry};
use tracing::info;

/// Poll-loop counters, registered in a private registry
#[derive(Clone)]
pub struct TraderMetrics {
    registry: Registry,
    pub cycles: IntCounter,
    pub pairs_evaluated: IntCounter,
    pub proposals: IntCounter,
    pub paired_completed: IntCounter,
    pub paired_failed: IntCounter,
    pub one_legged: IntCounter,
    pub fetch_errors: IntCounter,
    pub last_pair_count: IntGauge,
}

impl TraderMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("yobit_trader".to_string()), None)?;

        let cycles = IntCounter::new("cycles_total", "Completed poll cycles")?;
        let pairs_evaluated = IntCounter::new("pairs_evaluated_total", "Pairs run through the evaluator")?;
        let proposals = IntCounter::new("proposals_total", "Paired trades proposed")?;
        let paired_completed = IntCounter::new("paired_completed_total", "Paired trades with both legs placed")?;
        let paired_failed = IntCounter::new("paired_failed_total", "Paired trades with a failed leg")?;
        let one_legged = IntCounter::new("one_legged_total", "Buy legs left without a matching sell")?;
        let fetch_errors = IntCounter::new("fetch_errors_total", "Failed pair list or batch fetches")?;
        let last_pair_count = IntGauge::new("pairs_listed", "Pairs in the latest pair list")?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(pairs_evaluated.clone()))?;
        registry.register(Box::new(proposals.clone()))?;
        registry.register(Box::new(paired_completed.clone()))?;
        registry.register(Box::new(paired_failed.clone()))?;
        registry.register(Box::new(one_legged.clone()))?;
        registry.register(Box::new(fetch_errors.clone()))?;
        registry.register(Box::new(last_pair_count.clone()))?;

        Ok(Self {
            registry,
            cycles,
            pairs_evaluated,
            proposals,
            paired_completed,
            paired_failed,
            one_legged,
            fetch_errors,
            last_pair_count,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn log_summary(&self) {
        info!(
            cycles = self.cycles.get(),
            pairs_listed = self.last_pair_count.get(),
            pairs_evaluated = self.pairs_evaluated.get(),
            proposals = self.proposals.get(),
            completed = self.paired_completed.get(),
            failed = self.paired_failed.get(),
            one_legged = self.one_legged.get(),
            fetch_errors = self.fetch_errors.get(),
            "Trader stats"
        );
    }
}
