use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SCHEME: &str = "sha256=";

/// Hex HMAC-SHA256 of `body`, formatted the way the provider sends it.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("{SCHEME}{}", hex::encode(mac.finalize().into_bytes())))
}

/// Constant-time check of a `sha256=<hex>` header against the raw body.
pub fn verify(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(signature) = header.trim().strip_prefix(SCHEME) else {
        return false;
    };
    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "app-secret";

    #[test]
    fn accepts_signature_of_same_body() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = sign(SECRET, body).unwrap();
        assert!(verify(SECRET, body, &header));
    }

    #[test]
    fn rejects_signature_of_different_body() {
        let header = sign(SECRET, b"{\"entry\":[]}").unwrap();
        assert!(!verify(SECRET, b"{\"entry\":[1]}", &header));
    }

    #[test]
    fn rejects_malformed_headers() {
        let body = b"payload";
        assert!(!verify(SECRET, body, "md5=abcd"));
        assert!(!verify(SECRET, body, "sha256=not-hex"));
        assert!(!verify(SECRET, body, ""));
        let other = sign("other-secret", body).unwrap();
        assert!(!verify(SECRET, body, &other));
    }
}
