#![deny(unsafe_code)]

use sha2::Digest;

/// Hex sha256 of a schema config's raw bytes. Fingerprints identify the
/// exact config a record was normalized against.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_identical_bytes() {
        assert_eq!(sha256_hex(b"{}"), sha256_hex(b"{}"));
        assert_ne!(sha256_hex(b"{}"), sha256_hex(b"{ }"));
    }
}
