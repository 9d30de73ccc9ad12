//! HMAC-SHA256 verification of GitHub webhook deliveries.
//!
//! GitHub sends `X-Hub-Signature-256: sha256=<hex digest of the raw body>`.
//! The digest comparison is done by `Mac::verify_slice`, which is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Computes the header value GitHub would send for `body` signed with `secret`.
pub fn sign(body: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Returns `true` only when `signature` is exactly the `sha256=` digest of `body` under `secret`.
///
/// The header must match byte for byte: no surrounding whitespace, lowercase hex.
/// Absent, malformed, or wrong-length headers yield `false`.
pub fn verify(body: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(header) = signature else {
        return false;
    };
    let Some(hex_digest) = header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    if !is_lowercase_sha256_hex(hex_digest) {
        return false;
    }
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// GitHub always sends 64 lowercase hex digits.
fn is_lowercase_sha256_hex(digest: &str) -> bool {
    digest.len() == 64
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
