// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Validated protect/unlock requests built from raw form input (UI-agnostic).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reasons a form submission is rejected before any file or document work starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file selected")]
    MissingFile,
    #[error("password is empty")]
    MissingPassword,
    #[error("password confirmation does not match")]
    PasswordMismatch,
}

/// The two workflows offered by the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Workflow {
    Protect,
    Unlock,
}

/// Add a password to `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtectionRequest {
    pub source: PathBuf,
    pub password: String,
}

/// Remove the password from `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockRequest {
    pub source: PathBuf,
    pub password: String,
}

impl ProtectionRequest {
    /// Build a request from raw form input.
    ///
    /// Passwords are trimmed first; checks run in order file, password, confirmation so
    /// the user always sees the first problem in the form.
    pub fn from_input(
        file: Option<&Path>,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, ValidationError> {
        let source = file.ok_or(ValidationError::MissingFile)?;
        let password = password.trim();
        if password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        if password != confirmation.trim() {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Self {
            source: source.to_path_buf(),
            password: password.to_string(),
        })
    }
}

impl UnlockRequest {
    /// Build a request from raw form input (file first, then password).
    pub fn from_input(file: Option<&Path>, password: &str) -> Result<Self, ValidationError> {
        let source = file.ok_or(ValidationError::MissingFile)?;
        let password = password.trim();
        if password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        Ok(Self {
            source: source.to_path_buf(),
            password: password.to_string(),
        })
    }
}
