//! Digest extraction from HEAD response headers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::checksum::Digest;

/// Decode a `Content-MD5` value (base64 of the 16 digest bytes).
pub fn digest_from_content_md5(value: &str) -> Option<Digest> {
    let bytes = match STANDARD.decode(value.trim()) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("ignoring malformed Content-MD5 {:?}: {}", value, e);
            return None;
        }
    };
    let digest = Digest::from_bytes(&bytes);
    if digest.is_none() {
        tracing::warn!(
            "ignoring Content-MD5 {:?}: decodes to {} bytes, expected 16",
            value,
            bytes.len()
        );
    }
    digest
}

/// Treat an entity tag as an MD5 digest when it is exactly 32 hex characters.
///
/// Heuristic: many servers derive ETags from MD5, but a 32-hex tag that is not
/// a content hash will simply compare unequal and trigger a re-download.
pub fn digest_from_etag(value: &str) -> Option<Digest> {
    let tag = value.trim().trim_matches('"');
    if tag.len() != 32 || !tag.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Digest::from_hex(tag)
}
