use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::error::{ExchangeError, Result};
use crate::data::{Depth, PairId, Trade};

/// `info` response; only the pair table is consumed
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    pub pairs: HashMap<PairId, Value>,
}

pub type TradesResponse = HashMap<PairId, Vec<Trade>>;

pub type DepthResponse = HashMap<PairId, Depth>;

/// Result of a `Trade` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub received: Decimal,
    #[serde(default)]
    pub remains: Decimal,
    /// Zero when the order filled immediately and nothing rests on the book
    pub order_id: u64,
    #[serde(default)]
    pub funds: HashMap<String, Decimal>,
}

impl OrderReceipt {
    pub fn is_resting(&self) -> bool {
        self.order_id != 0
    }
}

/// Result of a `CancelOrder` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelReceipt {
    pub order_id: u64,
    #[serde(default)]
    pub funds: HashMap<String, Decimal>,
}

/// Private API envelope: `{"success":1,"return":{..}}` or `{"success":0,"error":".."}`
#[derive(Debug, Clone, Deserialize)]
struct PrivateEnvelope {
    success: i64,
    #[serde(rename = "return")]
    payload: Option<Value>,
    error: Option<String>,
}

/// Unwrap a private response into its typed payload
pub fn parse_private<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: PrivateEnvelope = serde_json::from_str(body)?;

    if envelope.success != 1 {
        let reason = envelope
            .error
            .unwrap_or_else(|| "unspecified error".to_string());
        return Err(ExchangeError::Exchange(reason));
    }

    let payload = envelope
        .payload
        .ok_or_else(|| ExchangeError::Protocol("missing `return` field".to_string()))?;

    Ok(serde_json::from_value(payload)?)
}

/// Parse a public response, surfacing a top-level `error` as a rejection
pub fn parse_public<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(ExchangeError::Exchange(error.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}
