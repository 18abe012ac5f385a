//! Webhook signature verification (HMAC-SHA256).
//!
//! GitHub signs every delivery with the shared secret and sends the digest in
//! `X-Hub-Signature-256` as `sha256=<hex>`. Deliveries are verified before
//! their payload is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery's signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header is not of the form sha256=<hex>")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

fn keyed_mac(secret: &[u8]) -> Result<HmacSha256, SignatureError> {
    // HMAC accepts keys of any length; the error arm is unreachable in practice.
    HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)
}

/// Decodes a `sha256=<hex>` header into the raw digest.
///
/// ```
/// use pullie::webhooks::decode_signature_header;
///
/// assert_eq!(decode_signature_header("sha256=00ff"), Some(vec![0x00, 0xff]));
/// assert!(decode_signature_header("sha1=00ff").is_none());
/// assert!(decode_signature_header("sha256=zz").is_none());
/// ```
pub fn decode_signature_header(header: &str) -> Option<Vec<u8>> {
    hex::decode(header.strip_prefix("sha256=")?).ok()
}

/// Computes the `X-Hub-Signature-256` header value GitHub would send for
/// `payload`.
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> Result<String, SignatureError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(payload);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verifies a delivery's signature header against its payload.
///
/// The digest comparison is constant-time.
///
/// ```
/// use pullie::webhooks::{sign_payload, verify_signature, SignatureError};
///
/// let header = sign_payload(b"{}", b"secret").unwrap();
/// assert_eq!(verify_signature(b"{}", &header, b"secret"), Ok(()));
/// assert_eq!(
///     verify_signature(b"{}", &header, b"other"),
///     Err(SignatureError::Mismatch)
/// );
/// ```
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let expected = decode_signature_header(signature_header).ok_or(SignatureError::Malformed)?;
    let mut mac = keyed_mac(secret)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Test vector from GitHub's "validating webhook deliveries" documentation.
    #[test]
    fn github_documentation_vector() {
        let header = "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";
        assert_eq!(
            verify_signature(b"Hello, World!", header, b"It's a Secret to Everybody"),
            Ok(())
        );
        assert_eq!(
            sign_payload(b"Hello, World!", b"It's a Secret to Everybody").unwrap(),
            header
        );
    }

    #[test]
    fn malformed_headers_are_distinguished_from_mismatches() {
        let payload = b"payload";
        assert_eq!(
            verify_signature(payload, "", b"s"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(payload, "sha1=abcd", b"s"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(payload, "sha256=abc", b"s"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(payload, "sha256=abcd", b"s"),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let header = sign_payload(b"x", b"k").unwrap();
        let upper = format!("sha256={}", header["sha256=".len()..].to_uppercase());
        assert_eq!(verify_signature(b"x", &upper, b"k"), Ok(()));
    }

    proptest! {
        #[test]
        fn signed_payloads_verify(payload: Vec<u8>, secret: Vec<u8>) {
            let header = sign_payload(&payload, &secret).unwrap();
            prop_assert_eq!(verify_signature(&payload, &header, &secret), Ok(()));
        }

        #[test]
        fn other_secrets_are_rejected(payload: Vec<u8>, secret: Vec<u8>, other: Vec<u8>) {
            prop_assume!(secret != other);
            let header = sign_payload(&payload, &secret).unwrap();
            prop_assert_eq!(
                verify_signature(&payload, &header, &other),
                Err(SignatureError::Mismatch)
            );
        }

        #[test]
        fn tampered_payloads_are_rejected(payload: Vec<u8>, tampered: Vec<u8>, secret: Vec<u8>) {
            prop_assume!(payload != tampered);
            let header = sign_payload(&payload, &secret).unwrap();
            prop_assert!(verify_signature(&tampered, &header, &secret).is_err());
        }

        #[test]
        fn arbitrary_headers_never_panic(header: String, payload: Vec<u8>) {
            let _ = verify_signature(&payload, &header, b"secret");
        }
    }
}
