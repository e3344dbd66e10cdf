// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and workflow logic.

pub mod hash;

/// Short hex fingerprints for log lines.
pub use hash::{digest_fingerprint, fingerprint};
/// Compute the SHA-256 digest of a buffer.
pub use hash::sha256;

/// Human readable byte count for status lines.
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if bytes < 1024 {
        format!("{bytes} B")
    } else if (bytes as f64) < MB {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{:.2} MB", bytes as f64 / MB)
    }
}
