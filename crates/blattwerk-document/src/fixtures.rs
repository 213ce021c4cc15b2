// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small PDFs built in memory for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::model::Document;

/// A PDF with one page per `(width, height)`, each showing "Page N".
pub fn pdf_with_pages(sizes: &[(f64, f64)]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = helvetica_resources(&mut doc);

    let kids: Vec<Object> = sizes
        .iter()
        .enumerate()
        .map(|(index, &(width, height))| {
            let content_id = text_stream(&mut doc, &format!("Page {}", index + 1));
            let page_id = doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
                ("Resources", Object::Reference(resources_id)),
                ("MediaBox", media_box(0.0, 0.0, width, height)),
            ]));
            Object::Reference(page_id)
        })
        .collect();

    finish(doc, pages_id, kids, Dictionary::new())
}

/// A PDF whose pages take `/MediaBox` and `/Resources` from the page tree.
pub fn pdf_with_inherited_media_box(count: usize, width: f64, height: f64) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = helvetica_resources(&mut doc);

    let kids = (0..count)
        .map(|index| {
            let content_id = text_stream(&mut doc, &format!("Inherited {}", index + 1));
            Object::Reference(doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ])))
        })
        .collect();

    let inherited = Dictionary::from_iter([
        ("MediaBox", media_box(0.0, 0.0, width, height)),
        ("Resources", Object::Reference(resources_id)),
    ]);
    finish(doc, pages_id, kids, inherited)
}

/// One page with media box `[50 50 250 300]` and crop box `[60 60 160 210]`.
pub fn pdf_with_offset_crop() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = helvetica_resources(&mut doc);
    let content_id = text_stream(&mut doc, "Offset");
    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        ("MediaBox", media_box(50.0, 50.0, 250.0, 300.0)),
        ("CropBox", media_box(60.0, 60.0, 160.0, 210.0)),
    ]));
    finish(doc, pages_id, vec![Object::Reference(page_id)], Dictionary::new())
}

/// One page carrying a text annotation and its popup, linked by `/Parent`.
pub fn pdf_with_popup_annotation() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();
    let markup_id = doc.new_object_id();
    let popup_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Popup".to_vec())),
        ("Rect", media_box(120.0, 120.0, 220.0, 180.0)),
        ("Parent", Object::Reference(markup_id)),
    ]));
    doc.objects.insert(
        markup_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Text".to_vec())),
            ("Rect", media_box(100.0, 100.0, 120.0, 120.0)),
            ("Contents", Object::string_literal("Check this")),
            ("P", Object::Reference(page_id)),
            ("Popup", Object::Reference(popup_id)),
        ])),
    );
    doc.objects.insert(
        page_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", media_box(0.0, 0.0, 300.0, 300.0)),
            (
                "Annots",
                Object::Array(vec![
                    Object::Reference(markup_id),
                    Object::Reference(popup_id),
                ]),
            ),
        ])),
    );
    finish(doc, pages_id, vec![Object::Reference(page_id)], Dictionary::new())
}

/// Loaded document with `count` US Letter pages.
pub fn letter_document(count: usize) -> Document {
    let sizes = vec![(612.0, 792.0); count];
    match Document::load(&pdf_with_pages(&sizes)) {
        Ok(doc) => doc,
        Err(err) => panic!("fixture failed to load: {err}"),
    }
}

fn helvetica_resources(doc: &mut lopdf::Document) -> ObjectId {
    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]))
}

fn text_stream(doc: &mut lopdf::Document, text: &str) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 72.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let bytes = content.encode().unwrap_or_default();
    doc.add_object(Stream::new(Dictionary::new(), bytes))
}

fn media_box(x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
    Object::Array(
        [x0, y0, x1, y1]
            .into_iter()
            .map(|v| Object::Real(v as f32))
            .collect(),
    )
}

fn finish(
    mut doc: lopdf::Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    mut pages: Dictionary,
) -> Vec<u8> {
    let count = kids.len() as i64;
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(kids));
    pages.set("Count", Object::Integer(count));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap_or_default();
    output
}
