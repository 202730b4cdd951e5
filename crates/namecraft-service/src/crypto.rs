//! Webhook signature verification.
//!
//! Creem signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the hex digest in the `creem-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 and return the hex-encoded digest (64 characters).
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &[u8]) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message);

    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check a `creem-signature` header value against the payload.
///
/// The header is compared case-insensitively after trimming.
#[must_use]
pub fn verify_creem_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let expected = hmac_sha256_hex(secret, payload);
    constant_time_eq(&expected, &signature.trim().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_matches_rfc_4231_vector() {
        // RFC 4231 test case 2.
        let result = hmac_sha256_hex("Jefe", b"what do ya want for nothing?");
        assert_eq!(
            result,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn constant_time_eq_compares_content_and_length() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
    }

    #[test]
    fn verifies_creem_signature() {
        let body = br#"{"id":"evt_1","eventType":"checkout.completed"}"#;
        let signature = hmac_sha256_hex("whsec", body);

        assert!(verify_creem_signature("whsec", body, &signature));
        assert!(verify_creem_signature(
            "whsec",
            body,
            &signature.to_ascii_uppercase()
        ));
        assert!(!verify_creem_signature("other", body, &signature));
        assert!(!verify_creem_signature("whsec", b"tampered", &signature));
    }
}
