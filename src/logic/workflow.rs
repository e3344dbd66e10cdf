// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Protect and unlock runs: read the file, transform it, deliver the result.
//!
//! Both workflows go through [`run`], parameterized by a [`DocumentTransform`]. The
//! collaborators arrive through [`WorkflowContext`], so tests can swap any of them.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logic::capability::{
    CapabilityError, CapabilityErrorKind, DocumentCapability, LoadOptions, Protection,
};
use crate::logic::download::{
    Download, DeliveryError, DownloadSink, PROTECTED_SUFFIX, UNLOCKED_SUFFIX, with_suffix,
};
use crate::logic::messages;
use crate::logic::reader::{FileSource, ReadError};
use crate::models::{
    Delivered, ErrorKind, Failure, Language, Outcome, ProtectionRequest, UnlockFallback,
    UnlockRequest, Workflow,
};
use crate::utils::{fingerprint, format_bytes};

/// Collaborators and settings for one run.
pub struct WorkflowContext<'a, C: DocumentCapability> {
    pub files: &'a dyn FileSource,
    pub capability: &'a C,
    pub sink: &'a dyn DownloadSink,
    pub language: Language,
    pub unlock_fallback: UnlockFallback,
}

/// Any failure after validation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Read(_) => ErrorKind::Read,
            WorkflowError::Capability(err) => err.kind.into(),
            WorkflowError::Delivery(_) => ErrorKind::Delivery,
        }
    }
}

/// A validated request that knows how to turn input bytes into output bytes.
pub trait DocumentTransform {
    const WORKFLOW: Workflow;
    /// Inserted into the source file name to name the output.
    const SUFFIX: &'static str;

    fn source(&self) -> &Path;

    fn transform<C: DocumentCapability>(
        &self,
        ctx: &WorkflowContext<'_, C>,
        bytes: &[u8],
    ) -> Result<Vec<u8>, CapabilityError>;

    fn failure_message(lang: Language, kind: ErrorKind) -> &'static str;

    fn success_message(lang: Language, file_name: &str) -> String {
        messages::saved(lang, file_name)
    }
}

impl DocumentTransform for ProtectionRequest {
    const WORKFLOW: Workflow = Workflow::Protect;
    const SUFFIX: &'static str = PROTECTED_SUFFIX;

    fn source(&self) -> &Path {
        &self.source
    }

    fn transform<C: DocumentCapability>(
        &self,
        ctx: &WorkflowContext<'_, C>,
        bytes: &[u8],
    ) -> Result<Vec<u8>, CapabilityError> {
        let capability = ctx.capability;
        let mut doc = capability.load(bytes, &LoadOptions::default())?;
        capability.encrypt(&mut doc, &Protection::single_password(&self.password))?;
        capability.save(&mut doc)
    }

    fn failure_message(lang: Language, kind: ErrorKind) -> &'static str {
        messages::protect_failure(lang, kind)
    }
}

impl DocumentTransform for UnlockRequest {
    const WORKFLOW: Workflow = Workflow::Unlock;
    const SUFFIX: &'static str = UNLOCKED_SUFFIX;

    fn source(&self) -> &Path {
        &self.source
    }

    fn transform<C: DocumentCapability>(
        &self,
        ctx: &WorkflowContext<'_, C>,
        bytes: &[u8],
    ) -> Result<Vec<u8>, CapabilityError> {
        let capability = ctx.capability;
        let with_password = LoadOptions::with_password(self.password.as_str());
        let doc = match capability.load(bytes, &with_password) {
            Ok(doc) => doc,
            Err(err) if err.kind == CapabilityErrorKind::NotEncrypted => {
                log::warn!("document has no password; copying its pages unchanged");
                capability.load(bytes, &LoadOptions::default())?
            }
            Err(err)
                if err.kind == CapabilityErrorKind::EncryptedDocument
                    && ctx.unlock_fallback == UnlockFallback::IgnoreEncryption =>
            {
                log::warn!("could not decrypt ({}); retrying with encryption ignored", err.detail);
                capability.load(bytes, &with_password.ignoring_encryption())?
            }
            Err(err) => return Err(err),
        };

        let mut copy = capability.copy_pages(&doc)?;
        log::debug!("copied {} pages into a fresh document", capability.page_count(&copy));
        capability.save(&mut copy)
    }

    fn failure_message(lang: Language, kind: ErrorKind) -> &'static str {
        messages::unlock_failure(lang, kind)
    }
}

/// Run one workflow to completion and classify the result for the form.
pub fn run<T, C>(request: &T, ctx: &WorkflowContext<'_, C>) -> Outcome
where
    T: DocumentTransform,
    C: DocumentCapability,
{
    match execute(request, ctx) {
        Ok((file_name, path, size)) => {
            log::info!(
                "{:?}: wrote {} ({})",
                T::WORKFLOW,
                path.display(),
                format_bytes(size)
            );
            Ok(Delivered {
                user_message: T::success_message(ctx.language, &file_name),
                download_name: file_name,
                path,
                size,
            })
        }
        Err(err) => {
            let kind = err.kind();
            log::error!(
                "{:?} of {} failed ({kind:?}): {:#}",
                T::WORKFLOW,
                request.source().display(),
                anyhow::Error::new(err)
            );
            Err(Failure {
                kind,
                user_message: T::failure_message(ctx.language, kind).to_string(),
            })
        }
    }
}

fn execute<T, C>(
    request: &T,
    ctx: &WorkflowContext<'_, C>,
) -> Result<(String, PathBuf, usize), WorkflowError>
where
    T: DocumentTransform,
    C: DocumentCapability,
{
    let source = request.source();
    let bytes = ctx.files.read(source)?;
    log::debug!(
        "{:?}: read {} ({}, {})",
        T::WORKFLOW,
        source.display(),
        format_bytes(bytes.len()),
        fingerprint(&bytes)
    );

    let output = request.transform(ctx, &bytes)?;

    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let download = Download {
        file_name: with_suffix(&name, T::SUFFIX),
        source_dir: source.parent().map(Path::to_path_buf).unwrap_or_default(),
        bytes: output,
    };
    let path = ctx.sink.deliver(&download)?;
    // The sink may have picked a free name next to an existing output.
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(download.file_name);
    Ok((file_name, path, download.bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use crate::logic::download::FolderSink;
    use crate::logic::fixtures::{
        owner_only_pdf, page_text, pdf_with_pages, protected_pdf, public_key_pdf,
    };
    use crate::logic::pdf::LopdfCapability;
    use crate::logic::reader::FsFileSource;

    #[derive(Default)]
    struct CountingFiles {
        reads: AtomicUsize,
        missing: bool,
    }

    impl FileSource for CountingFiles {
        fn read(&self, path: &Path) -> Result<Vec<u8>, ReadError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.missing {
                return Err(ReadError::NotAFile(path.to_path_buf()));
            }
            Ok(b"%PDF".to_vec())
        }
    }

    /// Documents are page counts; `load_error` fails every load that does not ignore encryption.
    #[derive(Default)]
    struct FakeCapability {
        loads: Mutex<Vec<LoadOptions>>,
        encrypts: AtomicUsize,
        load_error: Option<CapabilityErrorKind>,
    }

    impl DocumentCapability for FakeCapability {
        type Document = usize;

        fn load(&self, _bytes: &[u8], options: &LoadOptions) -> Result<usize, CapabilityError> {
            self.loads.lock().unwrap().push(options.clone());
            match self.load_error {
                Some(kind) if !options.ignore_encryption => Err(CapabilityError::new(kind, "fake")),
                _ => Ok(3),
            }
        }

        fn encrypt(&self, _doc: &mut usize, _protection: &Protection) -> Result<(), CapabilityError> {
            self.encrypts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn copy_pages(&self, doc: &usize) -> Result<usize, CapabilityError> {
            Ok(*doc)
        }

        fn save(&self, doc: &mut usize) -> Result<Vec<u8>, CapabilityError> {
            Ok(vec![0; *doc])
        }

        fn page_count(&self, doc: &usize) -> usize {
            *doc
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<Download>>,
    }

    impl DownloadSink for RecordingSink {
        fn deliver(&self, download: &Download) -> Result<PathBuf, DeliveryError> {
            self.delivered.lock().unwrap().push(download.clone());
            Ok(download.source_dir.join(&download.file_name))
        }
    }

    fn ctx<'a, C: DocumentCapability>(
        files: &'a dyn FileSource,
        capability: &'a C,
        sink: &'a dyn DownloadSink,
    ) -> WorkflowContext<'a, C> {
        WorkflowContext {
            files,
            capability,
            sink,
            language: Language::English,
            unlock_fallback: UnlockFallback::Strict,
        }
    }

    fn unlock_request(path: &Path, password: &str) -> UnlockRequest {
        UnlockRequest::from_input(Some(path), password).unwrap()
    }

    fn protect_request(path: &Path, password: &str) -> ProtectionRequest {
        ProtectionRequest::from_input(Some(path), password, password).unwrap()
    }

    #[test]
    fn read_failure_skips_capability_and_sink() {
        let files = CountingFiles {
            missing: true,
            ..Default::default()
        };
        let capability = FakeCapability::default();
        let sink = RecordingSink::default();

        let failure = run(
            &protect_request(Path::new("/in/report.pdf"), "pw"),
            &ctx(&files, &capability, &sink),
        )
        .unwrap_err();

        assert_eq!(failure.kind, ErrorKind::Read);
        assert_eq!(
            failure.user_message,
            messages::protect_failure(Language::English, ErrorKind::Unknown)
        );
        assert!(capability.loads.lock().unwrap().is_empty());
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn protect_loads_without_password_then_encrypts() {
        let files = CountingFiles::default();
        let capability = FakeCapability::default();
        let sink = RecordingSink::default();

        let delivered = run(
            &protect_request(Path::new("/in/report.pdf"), "abc123"),
            &ctx(&files, &capability, &sink),
        )
        .unwrap();

        assert_eq!(delivered.download_name, "report-protected.pdf");
        assert_eq!(delivered.path, PathBuf::from("/in/report-protected.pdf"));
        assert_eq!(files.reads.load(Ordering::SeqCst), 1);
        assert_eq!(*capability.loads.lock().unwrap(), vec![LoadOptions::default()]);
        assert_eq!(capability.encrypts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn strict_unlock_reports_encrypted_document() {
        let files = CountingFiles::default();
        let capability = FakeCapability {
            load_error: Some(CapabilityErrorKind::EncryptedDocument),
            ..Default::default()
        };
        let sink = RecordingSink::default();

        let failure = run(
            &unlock_request(Path::new("/in/a.pdf"), "pw"),
            &ctx(&files, &capability, &sink),
        )
        .unwrap_err();

        assert_eq!(failure.kind, ErrorKind::EncryptedDocument);
        assert_eq!(capability.loads.lock().unwrap().len(), 1);
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn lenient_unlock_retries_once_ignoring_encryption() {
        let files = CountingFiles::default();
        let capability = FakeCapability {
            load_error: Some(CapabilityErrorKind::EncryptedDocument),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let mut context = ctx(&files, &capability, &sink);
        context.unlock_fallback = UnlockFallback::IgnoreEncryption;

        let delivered = run(&unlock_request(Path::new("/in/a.pdf"), "pw"), &context).unwrap();

        assert_eq!(delivered.download_name, "a-unlocked.pdf");
        let loads = capability.loads.lock().unwrap();
        assert_eq!(loads.len(), 2);
        assert!(loads[1].ignore_encryption);
        assert_eq!(loads[1].password.as_deref(), Some("pw"));
    }

    #[test]
    fn lenient_unlock_does_not_retry_wrong_password() {
        let files = CountingFiles::default();
        let capability = FakeCapability {
            load_error: Some(CapabilityErrorKind::InvalidPassword),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let mut context = ctx(&files, &capability, &sink);
        context.unlock_fallback = UnlockFallback::IgnoreEncryption;

        let failure = run(&unlock_request(Path::new("/in/a.pdf"), "pw"), &context).unwrap_err();

        assert_eq!(failure.kind, ErrorKind::InvalidPassword);
        assert_eq!(capability.loads.lock().unwrap().len(), 1);
    }

    struct Workspace {
        _tmp: TempDir,
        dir: PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let dir = tmp.path().to_path_buf();
            Self { _tmp: tmp, dir }
        }

        fn put(&self, name: &str, bytes: &[u8]) -> PathBuf {
            let path = self.dir.join(name);
            std::fs::write(&path, bytes).unwrap();
            path
        }

        fn entries(&self) -> usize {
            std::fs::read_dir(&self.dir).unwrap().count()
        }
    }

    fn real_ctx<'a>(
        capability: &'a LopdfCapability,
        sink: &'a FolderSink,
    ) -> WorkflowContext<'a, LopdfCapability> {
        ctx(&FsFileSource, capability, sink)
    }

    #[test]
    fn protect_report_names_protected_copy() {
        let ws = Workspace::new();
        let source = ws.put("report.pdf", &pdf_with_pages(1));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();

        let delivered = run(&protect_request(&source, "abc123"), &real_ctx(&capability, &sink)).unwrap();

        assert_eq!(delivered.download_name, "report-protected.pdf");
        assert!(delivered.user_message.contains("report-protected.pdf"));
        assert!(ws.dir.join("report-protected.pdf").is_file());
    }

    #[test]
    fn unlock_with_wrong_password_writes_nothing() {
        let ws = Workspace::new();
        let source = ws.put("report-protected.pdf", &protected_pdf(1, "abc123"));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();

        let failure = run(&unlock_request(&source, "wrong"), &real_ctx(&capability, &sink)).unwrap_err();

        assert_eq!(failure.kind, ErrorKind::InvalidPassword);
        assert_eq!(
            failure.user_message,
            messages::unlock_failure(Language::English, ErrorKind::InvalidPassword)
        );
        assert_eq!(ws.entries(), 1);
    }

    #[test]
    fn strict_unlock_of_owner_only_file_checks_the_password() {
        let ws = Workspace::new();
        let source = ws.put("o.pdf", &owner_only_pdf(2, "owner"));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();
        let context = real_ctx(&capability, &sink);

        let failure = run(&unlock_request(&source, "bogus"), &context).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidPassword);
        assert_eq!(ws.entries(), 1);

        let delivered = run(&unlock_request(&source, "owner"), &context).unwrap();
        assert_eq!(delivered.download_name, "o-unlocked.pdf");
        let bytes = std::fs::read(&delivered.path).unwrap();
        let doc = capability.load(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(capability.page_count(&doc), 2);
    }

    #[test]
    fn unlock_of_public_key_file_suggests_resaving() {
        let ws = Workspace::new();
        let source = ws.put("cert.pdf", &public_key_pdf(1));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();

        let failure = run(&unlock_request(&source, "fixture-user"), &real_ctx(&capability, &sink)).unwrap_err();

        assert_eq!(failure.kind, ErrorKind::UnsupportedScheme);
        assert_eq!(
            failure.user_message,
            messages::unlock_failure(Language::English, ErrorKind::UnsupportedScheme)
        );
        assert_eq!(ws.entries(), 1);
    }

    #[test]
    fn protect_of_protected_file_asks_to_unlock_first() {
        let ws = Workspace::new();
        let source = ws.put("locked.pdf", &protected_pdf(1, "secret"));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();

        let failure = run(&protect_request(&source, "abc123"), &real_ctx(&capability, &sink)).unwrap_err();

        assert_eq!(
            failure.user_message,
            messages::protect_failure(Language::English, ErrorKind::AlreadyEncrypted)
        );
        assert_eq!(ws.entries(), 1);
    }

    #[test]
    fn protect_then_unlock_keeps_every_page() {
        let ws = Workspace::new();
        let source = ws.put("notes.pdf", &pdf_with_pages(4));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();
        let context = real_ctx(&capability, &sink);

        let protected = run(&protect_request(&source, "abc123"), &context).unwrap();
        let unlocked = run(&unlock_request(&protected.path, "abc123"), &context).unwrap();

        assert_eq!(unlocked.download_name, "notes-protected-unlocked.pdf");
        let bytes = std::fs::read(&unlocked.path).unwrap();
        let doc = capability.load(&bytes, &LoadOptions::default()).unwrap();
        let inner = doc.document();
        assert!(inner.trailer.get(b"Encrypt").is_err());
        let streams: Vec<_> = inner
            .get_pages()
            .values()
            .map(|id| inner.get_page_content(*id).unwrap())
            .collect();
        assert_eq!(streams, (1..=4).map(page_text).collect::<Vec<_>>());
    }

    #[test]
    fn second_protect_keeps_first_output() {
        let ws = Workspace::new();
        let source = ws.put("report.pdf", &pdf_with_pages(1));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();
        let context = real_ctx(&capability, &sink);

        let first = run(&protect_request(&source, "abc123"), &context).unwrap();
        let second = run(&protect_request(&source, "abc123"), &context).unwrap();

        assert_eq!(first.download_name, "report-protected.pdf");
        assert_eq!(second.download_name, "report-protected (1).pdf");
        assert!(second.user_message.contains("report-protected (1).pdf"));
        assert_eq!(ws.entries(), 3);
    }

    #[test]
    fn unlock_of_plain_file_copies_pages() {
        let ws = Workspace::new();
        let source = ws.put("plain.pdf", &pdf_with_pages(2));
        let capability = LopdfCapability::default();
        let sink = FolderSink::default();

        let delivered = run(&unlock_request(&source, "anything"), &real_ctx(&capability, &sink)).unwrap();

        let bytes = std::fs::read(&delivered.path).unwrap();
        let doc = capability.load(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(capability.page_count(&doc), 2);
    }
}
