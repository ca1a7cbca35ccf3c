use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use super::auth::{self, Credentials, NonceSource};
use super::error::{ExchangeError, Result};
use super::types::{
    parse_private, parse_public, CancelReceipt, DepthResponse, InfoResponse, OrderReceipt,
    TradesResponse,
};
use crate::data::{PairId, Side};
use crate::exchange::{MarketData, OrderGateway};
use crate::utils::config::ExchangeConfig;

/// Yobit REST API client.
///
/// Holds no session state beyond the nonce counter of its credential.
/// Share one instance per key so private calls stay serialized on one
/// nonce sequence.
pub struct YobitRestClient {
    client: Client,
    public_url: Url,
    private_url: Url,
    credentials: Option<Credentials>,
    nonces: NonceSource,
}

impl YobitRestClient {
    /// Create new REST client
    pub fn new(
        public_url: &str,
        private_url: &str,
        timeout: Duration,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            public_url: Url::parse(public_url)?,
            private_url: Url::parse(private_url)?,
            credentials,
            nonces: NonceSource::new(),
        })
    }

    pub fn from_config(config: &ExchangeConfig, credentials: Option<Credentials>) -> Result<Self> {
        Self::new(
            &config.public_url,
            &config.private_url,
            Duration::from_secs(config.timeout_secs),
            credentials,
        )
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// `<public_url>/<method>[/<pair,pair,..>][?limit=n]`
    fn public_endpoint(&self, method: &str, pairs: &[PairId], limit: Option<usize>) -> Result<Url> {
        let mut url = self.public_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ExchangeError::Protocol("public url cannot be a base".to_string()))?;
            segments.pop_if_empty().push(method);
            if !pairs.is_empty() {
                let joined = pairs
                    .iter()
                    .map(PairId::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                segments.push(&joined);
            }
        }
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }

    async fn get_public<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExchangeError::Protocol(format!(
                "unexpected status {}: {}",
                status,
                truncate(&body)
            )));
        }

        parse_public(&body)
    }

    /// Execute signed POST request against the trade API
    async fn post_private<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ExchangeError::Signing("no API credentials configured".to_string()))?;

        let body = auth::build_private_body(method, params, self.nonces.next());
        let signature = credentials.sign(&body)?;

        info!("Executing {} with params: {}", method, body);

        let response = self
            .client
            .post(self.private_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Key", &credentials.api_key)
            .header("Sign", signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("{} failed: {} - {}", method, status, truncate(&text));
            return Err(ExchangeError::Protocol(format!(
                "unexpected status {}: {}",
                status,
                truncate(&text)
            )));
        }

        parse_private(&text)
    }
}

impl MarketData for YobitRestClient {
    async fn list_pairs(&self) -> Result<Vec<PairId>> {
        let url = self.public_endpoint("info", &[], None)?;
        let info: InfoResponse = self.get_public(url).await?;

        let mut pairs: Vec<PairId> = info.pairs.into_keys().collect();
        pairs.sort();
        Ok(pairs)
    }

    async fn get_trades(&self, pairs: &[PairId], limit: usize) -> Result<TradesResponse> {
        let url = self.public_endpoint("trades", pairs, Some(limit))?;
        self.get_public(url).await
    }

    async fn get_depth(&self, pairs: &[PairId], limit: usize) -> Result<DepthResponse> {
        let url = self.public_endpoint("depth", pairs, Some(limit))?;
        self.get_public(url).await
    }
}

impl OrderGateway for YobitRestClient {
    async fn place_order(
        &self,
        pair: &PairId,
        side: Side,
        rate: Decimal,
        amount: Decimal,
    ) -> Result<OrderReceipt> {
        let params = [
            ("pair", pair.to_string()),
            ("type", side.as_str().to_string()),
            ("rate", rate.normalize().to_string()),
            ("amount", amount.normalize().to_string()),
        ];

        let receipt: OrderReceipt = self.post_private("Trade", &params).await?;
        info!("Order accepted: {:?}", receipt);
        Ok(receipt)
    }

    async fn cancel_order(&self, order_id: u64) -> Result<CancelReceipt> {
        let params = [("order_id", order_id.to_string())];
        self.post_private("CancelOrder", &params).await
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
