// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Deliver output bytes to the user as a named PDF file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Content type of every delivered file.
pub const PDF_MIME: &str = "application/pdf";

/// Suffix appended by the protect workflow.
pub const PROTECTED_SUFFIX: &str = "-protected";

/// Suffix appended by the unlock workflow.
pub const UNLOCKED_SUFFIX: &str = "-unlocked";

/// Highest `(n)` tried when the output name is taken.
const MAX_NUMBERED: u32 = 999;

/// Insert `suffix` before the last `.` of `name`, or append it when there is none.
pub fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rfind('.') {
        Some(index) => format!("{}{}{}", &name[..index], suffix, &name[index..]),
        None => format!("{name}{suffix}"),
    }
}

/// `report-protected.pdf` becomes `report-protected (n).pdf`.
fn numbered(name: &str, n: u32) -> String {
    with_suffix(name, &format!(" ({n})"))
}

/// Bytes ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    /// Final file name, already carrying the workflow suffix.
    pub file_name: String,
    /// Directory of the source file, used when no output folder is configured.
    pub source_dir: PathBuf,
}

impl Download {
    pub fn content_type(&self) -> &'static str {
        PDF_MIME
    }
}

/// Failure while writing the output file.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write temporary file in {dir}: {source}")]
    Write {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to move output into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for finished documents.
pub trait DownloadSink: Send + Sync {
    /// Write the download and return where it ended up.
    fn deliver(&self, download: &Download) -> Result<PathBuf, DeliveryError>;
}

/// Writes files into a fixed folder, or next to the source when no folder is set.
#[derive(Clone, Debug, Default)]
pub struct FolderSink {
    output_dir: Option<PathBuf>,
}

impl FolderSink {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }

    fn target_dir<'a>(&'a self, download: &'a Download) -> &'a Path {
        self.output_dir.as_deref().unwrap_or(&download.source_dir)
    }
}

impl DownloadSink for FolderSink {
    fn deliver(&self, download: &Download) -> Result<PathBuf, DeliveryError> {
        let dir = self.target_dir(download);
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| DeliveryError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let write_err = |source| DeliveryError::Write {
            dir: dir.to_path_buf(),
            source,
        };
        // Dropping the temp file on any early return removes it.
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&download.bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // Existing outputs are never replaced; the next free `(n)` name is used instead.
        let mut target = dir.join(&download.file_name);
        let mut attempt = 0;
        loop {
            match tmp.persist_noclobber(&target) {
                Ok(_) => break,
                Err(err)
                    if err.error.kind() == io::ErrorKind::AlreadyExists
                        && attempt < MAX_NUMBERED =>
                {
                    attempt += 1;
                    tmp = err.file;
                    target = dir.join(numbered(&download.file_name, attempt));
                }
                Err(err) => {
                    return Err(DeliveryError::Persist {
                        path: target,
                        source: err.error,
                    });
                }
            }
        }
        if attempt > 0 {
            log::info!(
                "{} already exists; saved as {}",
                download.file_name,
                target.display()
            );
        }

        log::debug!(
            "wrote {} ({}) to {}",
            download.file_name,
            download.content_type(),
            target.display()
        );
        Ok(target)
    }
}
