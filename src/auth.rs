use base64::engine::{general_purpose, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::debug;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Request signing for the reservation backend.
pub struct RequestSigner;

impl RequestSigner {
    /// Generate a random nonce for API requests
    pub fn generate_nonce() -> String {
        rand::thread_rng().gen_range(10000000..99999999).to_string()
    }

    /// Get current timestamp for API requests
    pub fn get_timestamp() -> i64 {
        Utc::now().timestamp()
    }

    fn string_to_sign(method: &str, timestamp: i64, nonce: &str, body: &str) -> String {
        format!("{}\n{}\n{}\n{}", method, timestamp, nonce, body)
    }

    /// Sign `method`, `timestamp`, `nonce` and `body` with `secret`.
    ///
    /// The HMAC-SHA256 digest is hex encoded and the hex string is then
    /// base64 encoded.
    pub fn generate_signature(
        secret: &str,
        method: &str,
        timestamp: i64,
        nonce: &str,
        body: &str,
    ) -> String {
        let content = Self::string_to_sign(method, timestamp, nonce, body);

        // The body carries guest details; keep it out of the logs
        debug!("Signing {} request at {} with nonce {}", method, timestamp, nonce);

        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(content.as_bytes());

        let hex_hash = hex::encode(mac.finalize().into_bytes());
        general_purpose::STANDARD.encode(hex_hash.as_bytes())
    }
}
