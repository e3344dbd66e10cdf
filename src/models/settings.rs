// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User settings: message language, unlock fallback posture, encryption scheme and output folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming a settings file to load at startup.
pub const SETTINGS_ENV: &str = "PDFLOCK_SETTINGS";

/// Settings file picked up from the working directory when no override is given.
pub const DEFAULT_SETTINGS_FILE: &str = "pdflock.json";

/// Language used for form labels and messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
}

impl Language {
    /// Pick the variant of a text matching this language.
    pub fn pick(self, en: &'static str, ja: &'static str) -> &'static str {
        match self {
            Language::English => en,
            Language::Japanese => ja,
        }
    }
}

/// What unlock does when the password load reports an encrypted document it cannot open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockFallback {
    /// Report the failure.
    #[default]
    Strict,
    /// Retry once ignoring encryption and keep whatever content is readable.
    /// The password is not verified on this path.
    IgnoreEncryption,
}

/// Encryption applied by the protect workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionScheme {
    /// Standard security handler revision 3, 128-bit RC4.
    #[default]
    Rc4_128,
    /// Standard security handler revision 4, AES-128 crypt filter.
    Aes128,
}

impl EncryptionScheme {
    pub fn label(self) -> &'static str {
        match self {
            EncryptionScheme::Rc4_128 => "RC4 128-bit",
            EncryptionScheme::Aes128 => "AES 128-bit",
        }
    }
}

/// Persisted application settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: Language,
    pub unlock_fallback: UnlockFallback,
    pub scheme: EncryptionScheme,
    /// Directory for written files; `None` writes next to the source file.
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not valid settings JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Resolve startup settings: `PDFLOCK_SETTINGS`, then `pdflock.json`, then defaults.
    ///
    /// Never fails; unreadable files are logged and replaced by defaults.
    pub fn discover() -> Self {
        let candidate = std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_SETTINGS_FILE);
                local.is_file().then_some(local)
            });

        let Some(path) = candidate else {
            log::debug!("no settings file found, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("{err:#}; using default settings");
                Self::default()
            }
        }
    }
}
