use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::{ExchangeError, Result};

type HmacSha512 = Hmac<Sha512>;

/// API key and secret for the private endpoint
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read `YOBIT_API_KEY` / `YOBIT_API_SECRET`, `None` if either is unset
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("YOBIT_API_KEY").ok()?;
        let secret = std::env::var("YOBIT_API_SECRET").ok()?;
        if key.is_empty() || secret.is_empty() {
            return None;
        }
        Some(Self::new(key, secret))
    }

    pub fn sign(&self, body: &str) -> Result<String> {
        generate_signature(&self.api_secret, body)
    }
}

// Never print the secret, and only a prefix of the key.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.api_key.chars().take(4).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}…", prefix))
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Hex HMAC-SHA512 of the form-encoded body, keyed by the API secret
pub fn generate_signature(secret_key: &str, body: &str) -> Result<String> {
    let mut mac = HmacSha512::new_from_slice(secret_key.as_bytes())
        .map_err(|e| ExchangeError::Signing(e.to_string()))?;

    mac.update(body.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build the form-encoded body for a private call.
///
/// Method-specific fields come first, then `method` and `nonce`.
pub fn build_private_body(method: &str, params: &[(&str, String)], nonce: u64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("method", method);
    serializer.append_pair("nonce", &nonce.to_string());
    serializer.finish()
}

/// Strictly increasing nonce per credential.
///
/// Seeded from wall-clock seconds; two calls in the same second still
/// get distinct, increasing values.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start above a nonce already consumed elsewhere with the same key
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    pub fn next(&self) -> u64 {
        self.next_at(unix_seconds())
    }

    fn next_at(&self, now: u64) -> u64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_signature() {
        let body = "pair=ltc_btc&type=buy&rate=0.001&amount=1&method=Trade&nonce=1";

        let signature = generate_signature("test_secret_key", body).unwrap();

        // SHA-512 digest is 128 hex characters
        assert_eq!(signature.len(), 128);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        let again = generate_signature("test_secret_key", body).unwrap();
        assert_eq!(signature, again);

        let other = generate_signature("another_secret", body).unwrap();
        assert_ne!(signature, other);
    }

    #[test]
    fn test_known_signature_vector() {
        // RFC 4231 test case 2
        let signature = generate_signature("Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_build_private_body() {
        let params = vec![
            ("pair", "ltc_btc".to_string()),
            ("type", "buy".to_string()),
            ("rate", "0.0001".to_string()),
            ("amount", "1.5".to_string()),
        ];

        let body = build_private_body("Trade", &params, 1234567890);

        assert_eq!(
            body,
            "pair=ltc_btc&type=buy&rate=0.0001&amount=1.5&method=Trade&nonce=1234567890"
        );
    }

    #[test]
    fn test_nonce_strictly_increasing_within_one_second() {
        let nonces = NonceSource::new();

        let a = nonces.next_at(1000);
        let b = nonces.next_at(1000);
        let c = nonces.next_at(1000);

        assert_eq!(a, 1000);
        assert_eq!(b, 1001);
        assert_eq!(c, 1002);
    }

    #[test]
    fn test_nonce_follows_clock_forward() {
        let nonces = NonceSource::starting_after(50);

        assert_eq!(nonces.next_at(10), 51);
        assert_eq!(nonces.next_at(100), 100);
    }

    #[test]
    fn test_nonce_live_clock() {
        let nonces = NonceSource::new();
        let first = nonces.next();
        let second = nonces.next();
        assert!(second > first);
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("ABCDEFGH", "topsecret");
        let printed = format!("{:?}", creds);

        assert!(!printed.contains("topsecret"));
        assert!(!printed.contains("EFGH"));
        assert!(printed.contains("ABCD"));
    }
}
