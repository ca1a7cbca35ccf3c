use thiserror::Error;

/// Failure modes of a single exchange call
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Request could not be sent or the response never arrived
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response was not valid JSON or lacked an expected field
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Well-formed response in which the exchange rejected the request
    #[error("exchange rejected request: {0}")]
    Exchange(String),

    /// Private call attempted without credentials, or the key was unusable
    #[error("signing error: {0}")]
    Signing(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Protocol(err.to_string())
    }
}

impl ExchangeError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExchangeError::Exchange(_))
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
