// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! [`DocumentCapability`] backed by `lopdf`.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use lopdf::encryption::{DecryptionError, PasswordAlgorithm};
use lopdf::encryption::crypt_filters::{Aes128CryptFilter, CryptFilter};
use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions,
    StringFormat, dictionary,
};

use crate::logic::capability::{
    CapabilityError, CapabilityErrorKind, DocumentCapability, LoadOptions, PermissionPolicy,
    Protection,
};
use crate::models::EncryptionScheme;
use crate::utils::{digest_fingerprint, fingerprint, sha256};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

const CRYPT_FILTER: &[u8] = b"StdCF";

/// A parsed document plus the digest of the bytes it came from.
pub struct LoadedPdf {
    inner: Document,
    digest: Vec<u8>,
}

impl LoadedPdf {
    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.inner
    }

    /// Short hex prefix of the source digest, for log lines.
    pub fn fingerprint(&self) -> String {
        digest_fingerprint(&self.digest)
    }

    /// True when the document is encrypted now or was decrypted on load.
    fn carries_protection(&self) -> bool {
        self.inner.is_encrypted() || self.inner.encryption_state.is_some()
    }
}

impl std::fmt::Debug for LoadedPdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPdf")
            .field("version", &self.inner.version)
            .field("objects", &self.inner.objects.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Production capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct LopdfCapability {
    scheme: EncryptionScheme,
}

impl LopdfCapability {
    pub fn new(scheme: EncryptionScheme) -> Self {
        Self { scheme }
    }
}

impl DocumentCapability for LopdfCapability {
    type Document = LoadedPdf;

    fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<LoadedPdf, CapabilityError> {
        let digest = sha256(bytes);
        let parsed = match options.password.as_deref() {
            Some(password) if !options.ignore_encryption => {
                Document::load_mem_with_password(bytes, password)
            }
            _ => Document::load_mem(bytes),
        };
        let inner = parsed.map_err(classify)?;
        log::debug!(
            "parsed {} ({} objects, encrypted: {})",
            fingerprint(bytes),
            inner.objects.len(),
            inner.is_encrypted()
        );

        if options.ignore_encryption {
            return Ok(LoadedPdf { inner, digest });
        }
        if inner.is_encrypted() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::EncryptedDocument,
                "document is encrypted and could not be decrypted",
            ));
        }
        if options.password.is_some() && inner.encryption_state.is_none() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::NotEncrypted,
                "a password was given but the document is not encrypted",
            ));
        }
        if let Some(password) = options.password.as_deref() {
            verify_password(&inner, password)?;
        }
        Ok(LoadedPdf { inner, digest })
    }

    fn encrypt(&self, document: &mut LoadedPdf, protection: &Protection) -> Result<(), CapabilityError> {
        if document.carries_protection() {
            return Err(CapabilityError::new(
                CapabilityErrorKind::AlreadyEncrypted,
                "document already carries password protection",
            ));
        }
        ensure_file_id(&mut document.inner, &document.digest);

        let permissions = permissions(protection.permissions);
        let owner_password = protection.owner_password.as_str();
        let user_password = protection.user_password.as_str();
        let doc = &document.inner;
        let version = match self.scheme {
            EncryptionScheme::Rc4_128 => EncryptionVersion::V2 {
                document: doc,
                owner_password,
                user_password,
                key_length: 128,
                permissions,
            },
            EncryptionScheme::Aes128 => {
                let filter: Arc<dyn CryptFilter> = Arc::new(Aes128CryptFilter);
                EncryptionVersion::V4 {
                    document: doc,
                    encrypt_metadata: true,
                    crypt_filters: BTreeMap::from([(CRYPT_FILTER.to_vec(), filter)]),
                    stream_filter: CRYPT_FILTER.to_vec(),
                    string_filter: CRYPT_FILTER.to_vec(),
                    owner_password,
                    user_password,
                    permissions,
                }
            }
        };
        let state = EncryptionState::try_from(version).map_err(opaque)?;
        document.inner.encrypt(&state).map_err(opaque)?;
        log::debug!("applied {} protection", self.scheme.label());
        Ok(())
    }

    fn copy_pages(&self, document: &LoadedPdf) -> Result<LoadedPdf, CapabilityError> {
        let source = &document.inner;
        let pages = source.get_pages();

        let mut copy = Document::with_version(source.version.clone());
        let encrypt_id = source
            .trailer
            .get(b"Encrypt")
            .and_then(Object::as_reference)
            .ok();
        for (id, object) in &source.objects {
            if Some(*id) != encrypt_id {
                copy.objects.insert(*id, object.clone());
            }
        }
        copy.max_id = source.max_id;

        let pages_id = copy.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());
        for page_id in pages.values().copied() {
            let mut page = source
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map_err(opaque)?
                .clone();
            for key in INHERITABLE {
                if page.get(key).is_err()
                    && let Some(value) = inherited(source, &page, key)
                {
                    page.set(key.to_vec(), value);
                }
            }
            page.set("Parent", Object::Reference(pages_id));
            copy.objects.insert(page_id, Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        copy.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = copy.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        copy.trailer.set("Root", Object::Reference(catalog_id));
        if let Ok(id) = source.trailer.get(b"ID") {
            copy.trailer.set("ID", id.clone());
        }
        copy.prune_objects();

        Ok(LoadedPdf {
            inner: copy,
            digest: document.digest.clone(),
        })
    }

    fn save(&self, document: &mut LoadedPdf) -> Result<Vec<u8>, CapabilityError> {
        let mut buffer = Vec::new();
        document.inner.save_to(&mut buffer).map_err(opaque)?;
        Ok(buffer)
    }

    fn page_count(&self, document: &LoadedPdf) -> usize {
        document.inner.get_pages().len()
    }
}

/// Walk the `/Parent` chain of `page` looking for `key`.
fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent: Option<ObjectId> = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_object(parent?).and_then(Object::as_dict).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Encryption keys are derived from the first file identifier, so documents without one get
/// an identifier built from the input digest.
fn ensure_file_id(doc: &mut Document, digest: &[u8]) {
    if doc.trailer.get(b"ID").is_ok() {
        return;
    }
    let id = digest[..16.min(digest.len())].to_vec();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}

/// Accept `password` only when it matches the user or the owner entry.
///
/// lopdf opens documents with an empty user password whatever password is supplied, so an
/// owner-only document would otherwise unlock with any input.
fn verify_password(doc: &Document, password: &str) -> Result<(), CapabilityError> {
    let security = security_handler(doc).ok_or_else(|| {
        CapabilityError::new(
            CapabilityErrorKind::EncryptedDocument,
            "security handler dictionary is missing after decryption",
        )
    })?;

    // Rebuild the still-encrypted view the password algorithms read from.
    let mut sealed = Document::with_version(doc.version.clone());
    let security_id = sealed.add_object(security.clone());
    sealed.trailer.set("Encrypt", Object::Reference(security_id));
    if let Ok(id) = doc.trailer.get(b"ID") {
        sealed.trailer.set("ID", id.clone());
    }

    let algorithm = PasswordAlgorithm::try_from(&sealed).map_err(classify)?;
    let candidate = algorithm
        .sanitize_password(password)
        .map_err(|err| classify(err.into()))?;
    if algorithm.authenticate_user_password(&sealed, &candidate).is_ok()
        || algorithm.authenticate_owner_password(&sealed, &candidate).is_ok()
    {
        return Ok(());
    }
    Err(CapabilityError::new(
        CapabilityErrorKind::InvalidPassword,
        "password matches neither the user nor the owner password",
    ))
}

/// The standard security handler dictionary kept among the decrypted objects.
fn security_handler(doc: &Document) -> Option<&Dictionary> {
    doc.objects.values().filter_map(|object| object.as_dict().ok()).find(|dict| {
        dict.get(b"Filter")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Standard")
            && dict.has(b"O")
            && dict.has(b"U")
    })
}

fn permissions(policy: PermissionPolicy) -> Permissions {
    let mut flags = Permissions::empty();
    flags.set(Permissions::PRINTABLE, policy.printing);
    flags.set(
        Permissions::PRINTABLE_IN_HIGH_QUALITY,
        policy.printing && policy.high_quality_printing,
    );
    flags.set(Permissions::MODIFIABLE, policy.modifying);
    flags.set(Permissions::COPYABLE, policy.copying);
    flags.set(Permissions::ANNOTABLE, policy.annotating);
    flags.set(Permissions::FILLABLE, policy.filling_forms);
    flags.set(
        Permissions::COPYABLE_FOR_ACCESSIBILITY,
        policy.content_accessibility,
    );
    flags.set(Permissions::ASSEMBLABLE, policy.document_assembly);
    flags
}

fn classify(err: lopdf::Error) -> CapabilityError {
    let kind = match &err {
        lopdf::Error::InvalidPassword
        | lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
            CapabilityErrorKind::InvalidPassword
        }
        lopdf::Error::NotEncrypted => CapabilityErrorKind::NotEncrypted,
        lopdf::Error::UnsupportedSecurityHandler(_)
        | lopdf::Error::Decryption(
            DecryptionError::UnsupportedEncryption | DecryptionError::UnsupportedRevision,
        ) => CapabilityErrorKind::UnsupportedScheme,
        lopdf::Error::Decryption(_) => CapabilityErrorKind::EncryptedDocument,
        _ => CapabilityErrorKind::Unknown,
    };
    CapabilityError::new(kind, err.to_string())
}

fn opaque(err: impl Display) -> CapabilityError {
    CapabilityError::unknown(err.to_string())
}
