// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Turn the selected file into an in-memory byte buffer.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure while reading the selected file.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),
}

/// Source of input bytes.
pub trait FileSource: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ReadError>;
}

/// Reads from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsFileSource;

impl FileSource for FsFileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ReadError> {
        let mut file = File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = file.metadata().map_err(|source| ReadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(ReadError::NotAFile(path.to_path_buf()));
        }

        let mut bytes = Vec::with_capacity(meta.len() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|source| ReadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(bytes)
    }
}
