//! Integrity stamping for message bodies
//!
//! A stamp is the SHA-256 of the body rendered as lowercase hex. It detects
//! corruption between acceptance and retrieval; it is not an authenticator.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Length in hex characters of every digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Fixed-length hex fingerprint of a message body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the digest of `body`
pub fn stamp(body: &str) -> Digest {
    Digest(hex::encode(Sha256::digest(body.as_bytes())))
}

/// Whether `digest` matches `body`
pub fn verify(body: &str, digest: &Digest) -> bool {
    stamp(body) == *digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_is_deterministic() {
        assert_eq!(stamp("hello"), stamp("hello"));
    }

    #[test]
    fn test_stamp_known_vector() {
        assert_eq!(
            stamp("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_stamp_fixed_length() {
        assert_eq!(stamp("").as_str().len(), DIGEST_HEX_LEN);
        assert_eq!(stamp(&"x".repeat(10_000)).as_str().len(), DIGEST_HEX_LEN);
        assert!(stamp("hi").as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_distinct_bodies_distinct_stamps() {
        assert_ne!(stamp("hi"), stamp("hi "));
        assert_ne!(stamp("ping"), stamp("pong"));
    }

    #[test]
    fn test_verify() {
        let digest = stamp("body");
        assert!(verify("body", &digest));
        assert!(!verify("b0dy", &digest));
    }
}
