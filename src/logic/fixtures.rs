// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! In-memory PDF documents for tests.

use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, dictionary};

/// Content stream drawn on page `index` (1-based) of [`pdf_with_pages`].
pub(crate) fn page_text(index: usize) -> Vec<u8> {
    format!("BT\n/F1 12 Tf\n100 700 Td\n(Page {index}) Tj\nET\n").into_bytes()
}

fn build(pages: usize, with_id: bool) -> Document {
    let mut doc = Document::with_version("1.5");

    if with_id {
        let id = (1u8..=16).collect::<Vec<_>>();
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(id.clone(), lopdf::StringFormat::Literal),
                Object::String(id, lopdf::StringFormat::Literal),
            ]),
        );
    }

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    // MediaBox and Resources live on the page tree node so pages inherit them.
    let mut kids = Vec::with_capacity(pages);
    for index in 1..=pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_text(index)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Unprotected document with `pages` pages and a file identifier.
pub(crate) fn pdf_with_pages(pages: usize) -> Vec<u8> {
    to_bytes(build(pages, true))
}

/// Unprotected document without a trailer `/ID`.
pub(crate) fn pdf_without_id(pages: usize) -> Vec<u8> {
    to_bytes(build(pages, false))
}

fn encrypted(pages: usize, owner_password: &str, user_password: &str) -> Document {
    let mut doc = build(pages, true);
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    doc
}

/// Document with `pages` pages protected by `user_password` (RC4, 128 bit).
pub(crate) fn protected_pdf(pages: usize, user_password: &str) -> Vec<u8> {
    to_bytes(encrypted(pages, "fixture-owner", user_password))
}

/// Document that opens without a password but carries an owner password.
pub(crate) fn owner_only_pdf(pages: usize, owner_password: &str) -> Vec<u8> {
    to_bytes(encrypted(pages, owner_password, ""))
}

/// Protected document whose security handler is the public-key one.
pub(crate) fn public_key_pdf(pages: usize) -> Vec<u8> {
    let mut doc = encrypted(pages, "fixture-owner", "fixture-user");
    let security = match doc.trailer.get(b"Encrypt").and_then(Object::as_reference) {
        Ok(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut).unwrap(),
        Err(_) => doc.trailer.get_mut(b"Encrypt").and_then(Object::as_dict_mut).unwrap(),
    };
    security.set("Filter", Object::Name(b"Adobe.PubSec".to_vec()));
    to_bytes(doc)
}
