use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use yobit_flow_trader::{
    compute_trade_stat, Depth, DepthLevel, PairId, StrategyConfig, Trade, TradeKind,
    TriggerEvaluator,
};

const NOW: i64 = 1_700_000_000;

fn trades(n: usize) -> Vec<Trade> {
    (0..n)
        .map(|i| Trade {
            kind: if i % 3 == 0 { TradeKind::Ask } else { TradeKind::Bid },
            price: Some(dec!(0.0001)),
            amount: Decimal::new(i as i64 + 1, 3),
            tid: Some(i as u64),
            timestamp: NOW - i as i64,
        })
        .collect()
}

/// Flow statistics over windows of typical trade limits
fn bench_trade_stat(c: &mut Criterion) {
    let mut group = c.benchmark_group("trade_stat");

    for size in [20usize, 150, 2000] {
        let window = trades(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &window, |b, window| {
            b.iter(|| compute_trade_stat(black_box(window), 300, NOW));
        });
    }

    group.finish();
}

/// Full decision for one pair, the per-pair cost of a cycle
fn bench_evaluate(c: &mut Criterion) {
    let evaluator = TriggerEvaluator::new(StrategyConfig::default());
    let pair = PairId::from("ltc_btc");
    let window: Vec<Trade> = (0..20)
        .map(|i| Trade {
            kind: TradeKind::Bid,
            price: None,
            amount: dec!(0.1),
            tid: None,
            timestamp: NOW - i,
        })
        .collect();
    let depth = Depth {
        asks: vec![
            DepthLevel::new(dec!(0.0001), dec!(0.5)),
            DepthLevel::new(dec!(0.00011), dec!(2.0)),
        ],
        bids: vec![],
    };

    c.bench_function("evaluate_firing_pair", |b| {
        b.iter(|| {
            let stat = compute_trade_stat(black_box(&window), 300, NOW);
            black_box(evaluator.evaluate(&pair, &stat, black_box(&depth)))
        });
    });
}

criterion_group!(benches, bench_trade_stat, bench_evaluate);
criterion_main!(benches);
