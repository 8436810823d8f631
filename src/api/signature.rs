use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{error, warn};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies a GitHub `X-Hub-Signature-256` header against the raw request body.
///
/// `body` must be the bytes received on the wire; a re-serialized copy of the
/// parsed JSON will not verify. With no secret configured every delivery is
/// accepted. With a secret, an absent or malformed header is a failure.
/// The comparison runs in constant time and the result carries no reason.
pub fn verify_github_signature(body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        warn!("No webhook secret configured - skipping signature verification");
        return true;
    };

    let Some(signature) = signature else {
        error!("Webhook signature header missing");
        return false;
    };

    let Some(expected) = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
    else {
        error!("Webhook signature verification failed");
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return false;
        }
    };
    mac.update(body);

    if mac.verify_slice(&expected).is_ok() {
        true
    } else {
        error!("Webhook signature verification failed");
        false
    }
}

/// Computes the `sha256=<hex>` header value GitHub would send for `body`.
pub fn compute_signature(body: &[u8], secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}
