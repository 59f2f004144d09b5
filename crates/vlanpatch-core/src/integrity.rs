//! Advisory check against known firmware images
//!
//! Only images whose SHA-256 digest is listed here have been patched and
//! booted successfully. Anything else may still work, so a mismatch is
//! reported but never treated as an error.

use alloc::string::String;
use core::fmt::Write;

use sha2::{Digest, Sha256};

/// SHA-256 digests (lowercase hex) of known-good firmware images
pub const KNOWN_IMAGE_DIGESTS: &[&str] =
    &["121fafdef3328cde2c3bdee1b3977863175a902474870c35a31e4b45369a6998"];

/// Result of the image check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCheck {
    /// The image matches a known-good digest
    Known,
    /// The image is not in the known-good list
    Unknown {
        /// Lowercase hex SHA-256 digest of the image
        digest: String,
    },
}

impl ImageCheck {
    /// Check if the image matched a known digest
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known)
    }
}

/// Lowercase hex SHA-256 digest of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        // Writing to a String cannot fail
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// Compare `data` against the known-good digests
pub fn check_image(data: &[u8]) -> ImageCheck {
    let digest = sha256_hex(data);
    if KNOWN_IMAGE_DIGESTS.contains(&digest.as_str()) {
        ImageCheck::Known
    } else {
        ImageCheck::Unknown { digest }
    }
}
