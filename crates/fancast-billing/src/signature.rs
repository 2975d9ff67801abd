use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::BillingError;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the processor's signature header before any event is trusted.
///
/// Header format: comma-separated `t=<unix-seconds>` and one or more
/// `v1=<hex>` entries; the signed string is `"{t}.{payload}"`. Any one
/// matching `v1` digest passes (the processor sends several during secret
/// rotation). Failure here means the request mutates nothing.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
) -> Result<(), BillingError> {
    let mut timestamp: Option<&str> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| BillingError::signature("missing timestamp"))?;
    if candidates.is_empty() {
        return Err(BillingError::signature("missing v1 signature"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::signature("invalid signing secret"))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    for candidate in candidates {
        let Ok(decoded) = hex::decode(candidate) else {
            continue;
        };
        if constant_time_eq(&decoded, &expected) {
            return Ok(());
        }
    }

    Err(BillingError::signature("no matching v1 signature"))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Produces a header in the processor's format. Test-side counterpart of
/// [`verify_signature`].
pub fn sign_payload(payload: &[u8], timestamp: u64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={digest}")
}
