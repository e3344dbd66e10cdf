// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content digests used for log fingerprints and PDF file identifiers.

use sha2::{Digest, Sha256};

/// Number of digest bytes shown in log fingerprints.
const FINGERPRINT_LEN: usize = 6;

/// Compute the SHA-256 digest of an in-memory buffer.
pub fn sha256(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

/// Short lowercase hex fingerprint of a buffer, safe to put in logs.
///
/// # Examples
///
/// ```rust,ignore
/// let fp = pdflock::utils::fingerprint(b"%PDF-1.7");
/// assert_eq!(fp.len(), 12);
/// ```
pub fn fingerprint(bytes: &[u8]) -> String {
    digest_fingerprint(&sha256(bytes))
}

/// Fingerprint of an already computed digest.
pub fn digest_fingerprint(digest: &[u8]) -> String {
    hex::encode(&digest[..FINGERPRINT_LEN.min(digest.len())])
}
