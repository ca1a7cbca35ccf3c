pub mod auth;
pub mod error;
pub mod rest;
pub mod types;

pub use auth::{Credentials, NonceSource};
pub use error::ExchangeError;
pub use rest::YobitRestClient;
pub use types::*;
