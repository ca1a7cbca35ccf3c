use anyhow::{ensure, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::strategy::execution::CompensationPolicy;
use crate::strategy::StrategyConfig;

const DEFAULT_CONFIG_PATH: &str = "config/trader.toml";

/// Main configuration structure.
///
/// Every field has a default so a partial file (or none at all) works.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub strategy: StrategyConfig,
    pub polling: PollingConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub public_url: String,
    pub private_url: String,
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            public_url: "https://yobit.net/api/3/".to_string(),
            private_url: "https://yobit.net/tapi".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Pairs per trades/depth request
    pub batch_size: usize,
    /// Pause after a full pass over all pairs
    pub check_delay_secs: f64,
    pub trades_limit: usize,
    pub depth_limit: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            check_delay_secs: 5.0,
            trades_limit: 20,
            depth_limit: 10,
        }
    }
}

impl PollingConfig {
    pub fn check_delay(&self) -> Duration {
        Duration::from_secs_f64(self.check_delay_secs.max(0.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Log proposals but never send orders
    pub dry_run: bool,
    pub compensation: CompensationPolicy,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            compensation: CompensationPolicy::CancelBuy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub output: String,
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "pretty".to_string(),
            file_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Log a counter summary every N cycles
    pub summary_every_cycles: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            summary_every_cycles: 10,
        }
    }
}

impl MetricsConfig {
    /// Cycles between summaries; zero turns summaries off
    pub fn summary_interval(&self) -> u64 {
        if self.enabled {
            self.summary_every_cycles
        } else {
            0
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `CONFIG_FILE`, else `config/trader.toml` if present, else defaults
    pub fn load() -> Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.polling.batch_size > 0, "polling.batch_size must be positive");
        ensure!(self.polling.trades_limit > 0, "polling.trades_limit must be positive");
        ensure!(self.polling.depth_limit >= 2, "polling.depth_limit must cover two ask levels");
        ensure!(
            self.polling.check_delay_secs.is_finite() && self.polling.check_delay_secs >= 0.0,
            "polling.check_delay_secs must be a non-negative number"
        );
        ensure!(
            self.strategy.max_trade_btc > Decimal::ZERO,
            "strategy.max_trade_btc must be positive"
        );
        ensure!(
            self.strategy.mean_volume_multiplier >= Decimal::ZERO,
            "strategy.mean_volume_multiplier must not be negative"
        );
        ensure!(self.strategy.volume_precision <= 28, "strategy.volume_precision is at most 28");
        Ok(())
    }
}
