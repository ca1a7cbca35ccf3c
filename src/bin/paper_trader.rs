use anyhow::Context;
use tracing::info;
use yobit_flow_trader::utils::init_from_config;
use yobit_flow_trader::{
    Config, PaperGateway, PairedExecutor, PollLoop, TraderMetrics, TriggerEvaluator,
    YobitRestClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load()?;
    init_from_config(&config.logging)?;

    info!("Starting Yobit flow trader - Paper Trading Mode");
    info!("============================================");

    // Public endpoints only; no credentials needed
    let client = YobitRestClient::from_config(&config.exchange, None)
        .context("building REST client")?;

    let executor = PairedExecutor::new(PaperGateway::new(), config.execution.compensation);
    let evaluator = TriggerEvaluator::new(config.strategy.clone());
    let metrics = TraderMetrics::new()?;

    let poll_loop = PollLoop::new(&client, executor, evaluator, config.polling.clone(), metrics)
        .with_summary_every(config.metrics.summary_interval());

    poll_loop.run_forever().await;

    info!(
        "Paper orders sent: {}",
        poll_loop.executor().gateway().orders_sent()
    );
    Ok(())
}
