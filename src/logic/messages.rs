// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User-facing texts for form results, in English and Japanese.
//!
//! Every failure maps to exactly one fixed message per workflow.

use crate::models::{ErrorKind, Language, ValidationError, Workflow};

/// Message shown when a submission is rejected before any work starts.
pub fn validation(lang: Language, workflow: Workflow, err: ValidationError) -> &'static str {
    match (err, workflow) {
        (ValidationError::MissingFile, _) => {
            lang.pick("Please select a PDF file.", "PDF ファイルを選択してください。")
        }
        (ValidationError::MissingPassword, Workflow::Protect) => {
            lang.pick("Please enter a password.", "パスワードを入力してください。")
        }
        (ValidationError::MissingPassword, Workflow::Unlock) => lang.pick(
            "Please enter the password currently set on the PDF.",
            "現在設定されているパスワードを入力してください。",
        ),
        (ValidationError::PasswordMismatch, _) => lang.pick(
            "The confirmation password does not match.",
            "確認用パスワードが一致しません。",
        ),
    }
}

/// Message for a failed protect run.
pub fn protect_failure(lang: Language, kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::AlreadyEncrypted | ErrorKind::EncryptedDocument => lang.pick(
            "This PDF is already password protected. Unlock it first and try again.",
            "すでにパスワード保護された PDF です。解除してから再度お試しください。",
        ),
        _ => lang.pick(
            "Failed to add the password. Please check the PDF contents.",
            "パスワードの付与に失敗しました。PDF の内容をご確認ください。",
        ),
    }
}

/// Message for a failed unlock run.
pub fn unlock_failure(lang: Language, kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidPassword => lang.pick(
            "Please check that the password is correct.",
            "パスワードが正しいか確認してください。",
        ),
        ErrorKind::UnsupportedScheme | ErrorKind::EncryptedDocument => lang.pick(
            "The PDF may use an unsupported encryption method. Re-save it with another tool and try again.",
            "PDF の暗号方式に対応していない可能性があります。別のツールで再保存してからお試しください。",
        ),
        _ => lang.pick(
            "Failed to remove the password. Please check whether the PDF is damaged.",
            "パスワードの解除に失敗しました。PDF が破損していないか確認してください。",
        ),
    }
}

/// Success message naming the written file.
pub fn saved(lang: Language, file_name: &str) -> String {
    match lang {
        Language::English => format!("Saved {file_name}."),
        Language::Japanese => format!("{file_name} を保存しました。"),
    }
}

/// Submit button label while a run is in flight.
pub fn processing(lang: Language) -> &'static str {
    lang.pick("Processing…", "処理中…")
}
