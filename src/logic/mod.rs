// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic for protecting and unlocking PDF files.
//!
//! Responsibilities:
//! - Read the selected file into memory ([`reader`]).
//! - Drive the PDF library through a typed seam ([`capability`], [`pdf`]).
//! - Write the output file under a derived name ([`download`]).
//! - Run whole workflows and pick the user-facing message ([`workflow`], [`messages`]).

pub mod capability;
pub mod download;
pub mod messages;
pub mod pdf;
pub mod reader;
pub mod workflow;

#[cfg(test)]
pub(crate) mod fixtures;
