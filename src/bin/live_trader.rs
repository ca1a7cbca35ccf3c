use anyhow::{bail, Context};
use tracing::{info, warn};
use yobit_flow_trader::utils::init_from_config;
use yobit_flow_trader::{
    Config, Credentials, PairedExecutor, PollLoop, TraderMetrics, TriggerEvaluator,
    YobitRestClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::load()?;
    init_from_config(&config.logging)?;

    info!("Yobit flow trader - LIVE TRADING MODE");
    warn!("Real orders will be placed, capped at {} per trade", config.strategy.max_trade_btc);

    let Some(credentials) = Credentials::from_env() else {
        bail!("YOBIT_API_KEY and YOBIT_API_SECRET must be set");
    };
    info!("✓ API credentials loaded");

    let client = YobitRestClient::from_config(&config.exchange, Some(credentials))
        .context("building REST client")?;

    let metrics = TraderMetrics::new()?;
    let executor = PairedExecutor::new(&client, config.execution.compensation);
    let evaluator = TriggerEvaluator::new(config.strategy.clone());

    info!(
        "✓ Strategy: target {} buys ({:?}), lookback {}s, compensation {:?}",
        config.strategy.buy_count_target,
        config.strategy.trigger_mode,
        config.strategy.lookback_secs,
        config.execution.compensation
    );

    let poll_loop = PollLoop::new(&client, executor, evaluator, config.polling.clone(), metrics)
        .with_dry_run(config.execution.dry_run)
        .with_summary_every(config.metrics.summary_interval());

    info!("System ready. Press Ctrl+C to stop");
    poll_loop.run_forever().await;

    Ok(())
}
