// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: pure data types and validation helpers shared between UI and workflow logic.

pub mod outcome;
pub mod request;
pub mod settings;

pub use outcome::{Delivered, ErrorKind, Failure, Outcome};
pub use request::{ProtectionRequest, UnlockRequest, ValidationError, Workflow};
pub use settings::{EncryptionScheme, Language, Settings, UnlockFallback};
