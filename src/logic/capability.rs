// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Seam between the workflows and the PDF library.
//!
//! The workflows only see [`DocumentCapability`]; the production implementation lives in
//! [`crate::logic::pdf`]. Errors carry a [`CapabilityErrorKind`] so callers never need to
//! look at message text to decide what happened.

use thiserror::Error;

use crate::models::ErrorKind;

/// Options for [`DocumentCapability::load`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Password used to open an encrypted document.
    pub password: Option<String>,
    /// Return the parsed document even when it is encrypted and was not decrypted.
    pub ignore_encryption: bool,
}

impl LoadOptions {
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ignore_encryption: false,
        }
    }

    /// Same password, but skip decryption failures.
    pub fn ignoring_encryption(mut self) -> Self {
        self.ignore_encryption = true;
        self
    }
}

/// Permission flags written into the encryption dictionary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionPolicy {
    pub printing: bool,
    /// Only meaningful together with `printing`.
    pub high_quality_printing: bool,
    pub modifying: bool,
    pub copying: bool,
    pub annotating: bool,
    pub filling_forms: bool,
    pub content_accessibility: bool,
    pub document_assembly: bool,
}

impl PermissionPolicy {
    /// Policy applied by the protect workflow: print in high quality and allow assistive
    /// extraction, nothing else.
    pub const fn locked_down() -> Self {
        Self {
            printing: true,
            high_quality_printing: true,
            modifying: false,
            copying: false,
            annotating: false,
            filling_forms: false,
            content_accessibility: true,
            document_assembly: false,
        }
    }
}

/// Everything [`DocumentCapability::encrypt`] needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protection {
    pub owner_password: String,
    pub user_password: String,
    pub permissions: PermissionPolicy,
}

impl Protection {
    /// One password for both owner and user, with the locked-down permission policy.
    pub fn single_password(password: &str) -> Self {
        Self {
            owner_password: password.to_string(),
            user_password: password.to_string(),
            permissions: PermissionPolicy::locked_down(),
        }
    }
}

/// Typed failure classes reported by a capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityErrorKind {
    EncryptedDocument,
    AlreadyEncrypted,
    InvalidPassword,
    UnsupportedScheme,
    NotEncrypted,
    Unknown,
}

/// Error returned by every capability operation.
#[derive(Debug, Error)]
#[error("{kind:?}: {detail}")]
pub struct CapabilityError {
    pub kind: CapabilityErrorKind,
    pub detail: String,
}

impl CapabilityError {
    pub fn new(kind: CapabilityErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Unknown, detail)
    }
}

impl From<CapabilityErrorKind> for ErrorKind {
    fn from(kind: CapabilityErrorKind) -> Self {
        match kind {
            CapabilityErrorKind::EncryptedDocument => ErrorKind::EncryptedDocument,
            CapabilityErrorKind::AlreadyEncrypted => ErrorKind::AlreadyEncrypted,
            CapabilityErrorKind::InvalidPassword => ErrorKind::InvalidPassword,
            CapabilityErrorKind::UnsupportedScheme => ErrorKind::UnsupportedScheme,
            CapabilityErrorKind::NotEncrypted => ErrorKind::NotEncrypted,
            CapabilityErrorKind::Unknown => ErrorKind::Unknown,
        }
    }
}

/// Load, protect, copy and serialize PDF documents.
///
/// Implementations must be shareable across worker threads.
pub trait DocumentCapability: Send + Sync {
    type Document;

    /// Parse `bytes` into a document, applying `options` for encrypted input.
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<Self::Document, CapabilityError>;

    /// Add password protection in place.
    ///
    /// Fails with [`CapabilityErrorKind::AlreadyEncrypted`] when the document already carries
    /// protection.
    fn encrypt(
        &self,
        document: &mut Self::Document,
        protection: &Protection,
    ) -> Result<(), CapabilityError>;

    /// Build a fresh, unprotected document holding the pages of `document` in order.
    fn copy_pages(&self, document: &Self::Document) -> Result<Self::Document, CapabilityError>;

    /// Serialize the document.
    fn save(&self, document: &mut Self::Document) -> Result<Vec<u8>, CapabilityError>;

    fn page_count(&self, document: &Self::Document) -> usize;
}
