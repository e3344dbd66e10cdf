// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Result of one protect/unlock run as seen by the form that started it.

use std::path::PathBuf;

/// Classified failure cause, used to pick exactly one user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source file could not be read.
    Read,
    /// The document is encrypted and was not opened.
    EncryptedDocument,
    /// Protection was requested for a document that already carries it.
    AlreadyEncrypted,
    /// The supplied password does not open the document.
    InvalidPassword,
    /// The document uses a security handler or revision the library cannot process.
    UnsupportedScheme,
    /// A password was supplied for a document that has none.
    NotEncrypted,
    /// The output file could not be written.
    Delivery,
    /// Anything else (parse failures, serializer errors).
    Unknown,
}

/// Successful run: the output file has been written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivered {
    /// File name derived from the source name and the workflow suffix.
    pub download_name: String,
    /// Where the file ended up.
    pub path: PathBuf,
    /// Size of the written file in bytes.
    pub size: usize,
    pub user_message: String,
}

/// Failed run with the message already chosen for the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub user_message: String,
}

pub type Outcome = Result<Delivered, Failure>;
