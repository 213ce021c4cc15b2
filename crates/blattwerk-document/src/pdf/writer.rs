// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise the page model into a standalone PDF using `lopdf`.
//
// Every page is deep-cloned out of the source PDF it points into. Objects
// shared between pages are cloned once per output, and inherited page
// attributes are materialised on the written page because the output gets a
// fresh, flat page tree.

use std::collections::HashMap;

use blattwerk_core::error::{BlattwerkError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::model::{Document, Page, SourceDocument, TextMark};
use crate::pdf::reader::inherited;

/// Resource name under which stamped marks reference Helvetica.
const MARK_FONT: &str = "BwMark";

/// Serialise `document` to PDF bytes, stamped marks included.
#[instrument(skip_all, fields(pages = document.page_count()))]
pub fn write_document(document: &Document) -> Result<Vec<u8>> {
    let mut pdf = build_pdf(document, true)?;
    let mut output = Vec::new();
    pdf.save_to(&mut output)
        .map_err(|err| BlattwerkError::Pdf(format!("failed to serialise PDF: {err}")))?;
    debug!(bytes = output.len(), "PDF written");
    Ok(output)
}

/// Build an in-memory PDF holding every page of `document` in order.
///
/// With `include_marks` unset the pages are written as their bare content,
/// which is what re-binding page content after compaction needs.
pub(crate) fn build_pdf(document: &Document, include_marks: bool) -> Result<lopdf::Document> {
    let mut builder = PdfBuilder::new();

    // Reserve an output id for every page up front so that references between
    // pages (link destinations, annotation /P entries) resolve to the copies.
    let page_ids: Vec<ObjectId> = document
        .pages()
        .iter()
        .map(|page| builder.reserve_page(page))
        .collect();

    for (page, &page_id) in document.pages().iter().zip(&page_ids) {
        builder.write_page(page, page_id, include_marks)?;
    }

    Ok(builder.finish(&page_ids))
}

// -- Builder ------------------------------------------------------------------

struct PdfBuilder {
    target: lopdf::Document,
    pages_id: ObjectId,
    /// Source object -> output object, keyed by source document identity.
    memo: HashMap<(Uuid, ObjectId), ObjectId>,
    mark_font: Option<ObjectId>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut target = lopdf::Document::with_version("1.5");
        let pages_id = target.new_object_id();
        Self {
            target,
            pages_id,
            memo: HashMap::new(),
            mark_font: None,
        }
    }

    fn reserve_page(&mut self, page: &Page) -> ObjectId {
        let new_id = self.target.new_object_id();
        let key = (page.content().source().id(), page.content().page_id());
        // A page repeated within one document (merging a document with itself)
        // gets its own object; references keep pointing at the first copy.
        self.memo.entry(key).or_insert(new_id);
        new_id
    }

    fn write_page(&mut self, page: &Page, new_id: ObjectId, include_marks: bool) -> Result<()> {
        let content = page.content();
        let source = content.source();
        let source_page = source.pdf().get_dictionary(content.page_id()).map_err(|err| {
            BlattwerkError::Pdf(format!(
                "cannot read page object {:?}: {err}",
                content.page_id()
            ))
        })?;

        let mut dict = Dictionary::new();
        for (key, value) in source_page.iter() {
            if matches!(
                key.as_slice(),
                b"Parent" | b"MediaBox" | b"CropBox" | b"Resources" | b"Rotate"
            ) {
                continue;
            }
            let cloned = self.clone_object(source, value);
            dict.set(key.clone(), cloned);
        }

        let pdf = source.pdf();
        let resources = inherited(pdf, content.page_id(), b"Resources")
            .cloned()
            .map(|obj| self.clone_object(source, &obj));
        if let Some(rotate) = inherited(pdf, content.page_id(), b"Rotate") {
            dict.set("Rotate", rotate.clone());
        }

        let (ox, oy) = content.origin();
        let crop = page.crop();
        dict.set("Type", Object::Name(b"Page".to_vec()));
        dict.set("Parent", Object::Reference(self.pages_id));
        dict.set(
            "MediaBox",
            rect(ox, oy, ox + page.width(), oy + page.height()),
        );
        dict.set(
            "CropBox",
            rect(ox + crop.x0, oy + crop.y0, ox + crop.x1, oy + crop.y1),
        );

        if include_marks && !page.marks().is_empty() {
            self.stamp_marks(&mut dict, resources, page.marks(), (ox, oy))?;
        } else if let Some(resources) = resources {
            dict.set("Resources", resources);
        }

        self.target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(())
    }

    /// Wrap the existing content in `q`/`Q` and append a text stream for the
    /// marks, adding Helvetica to the page's resources.
    fn stamp_marks(
        &mut self,
        dict: &mut Dictionary,
        resources: Option<Object>,
        marks: &[TextMark],
        (ox, oy): (f64, f64),
    ) -> Result<()> {
        let font_id = self.mark_font();

        let mut operations = vec![Operation::new("Q", vec![])];
        for mark in marks {
            let [r, g, b] = mark.color.to_unit_rgb();
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "rg",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ),
                Operation::new(
                    "Tf",
                    vec![MARK_FONT.into(), Object::Real(mark.font_size as f32)],
                ),
                Operation::new("Td", vec![number(ox + mark.x), number(oy + mark.y)]),
                Operation::new("Tj", vec![Object::string_literal(mark.text.as_str())]),
                Operation::new("ET", vec![]),
            ]);
        }
        let marks_bytes = Content { operations }
            .encode()
            .map_err(|err| BlattwerkError::Pdf(format!("failed to encode marks: {err}")))?;

        let open_id = self
            .target
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let marks_id = self
            .target
            .add_object(Stream::new(Dictionary::new(), marks_bytes));

        let mut contents = vec![Object::Reference(open_id)];
        match dict.remove(b"Contents") {
            Some(Object::Array(items)) => contents.extend(items),
            Some(reference @ Object::Reference(_)) => contents.push(reference),
            _ => {}
        }
        contents.push(Object::Reference(marks_id));
        dict.set("Contents", Object::Array(contents));

        let mut resources = self.inline_dictionary(resources);
        let font_entry = resources.get(b"Font").ok().cloned();
        let mut fonts = self.inline_dictionary(font_entry);
        fonts.set(MARK_FONT, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
        dict.set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn mark_font(&mut self) -> ObjectId {
        if let Some(id) = self.mark_font {
            return id;
        }
        let id = self.target.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        self.mark_font = Some(id);
        id
    }

    /// Copy of an already-cloned dictionary value, following one reference.
    fn inline_dictionary(&self, value: Option<Object>) -> Dictionary {
        match value {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Reference(id)) => self
                .target
                .get_dictionary(id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        }
    }

    // -- Deep clone ---------------------------------------------------------------

    fn clone_reference(&mut self, source: &SourceDocument, id: ObjectId) -> ObjectId {
        let key = (source.id(), id);
        if let Some(&existing) = self.memo.get(&key) {
            return existing;
        }
        // Record the mapping before descending so reference cycles terminate.
        let new_id = self.target.new_object_id();
        self.memo.insert(key, new_id);

        let cloned = match source.pdf().get_object(id) {
            Ok(object) => self.clone_object(source, object),
            Err(err) => {
                warn!(?id, %err, "cannot resolve reference, writing null");
                Object::Null
            }
        };
        self.target.objects.insert(new_id, cloned);
        new_id
    }

    fn clone_object(&mut self, source: &SourceDocument, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.clone_reference(source, *id)),
            Object::Dictionary(dict) => Object::Dictionary(self.clone_dictionary(source, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.clone_object(source, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.clone_dictionary(source, &stream.dict);
                // Keep the stored bytes as-is; /Filter travels with the dict.
                let mut cloned = Stream::new(dict, stream.content.clone());
                cloned.allows_compression = stream.allows_compression;
                Object::Stream(cloned)
            }
            other => other.clone(),
        }
    }

    fn clone_dictionary(&mut self, source: &SourceDocument, dict: &Dictionary) -> Dictionary {
        // Page tree links are rebuilt by the builder, never copied. Other
        // /Parent links (popup annotations, form fields) are kept.
        let tree_node = matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page" | b"Pages")
        );
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            if tree_node && key == b"Parent" {
                continue;
            }
            let value = self.clone_object(source, value);
            cloned.set(key.clone(), value);
        }
        cloned
    }

    // -- Page tree ----------------------------------------------------------------

    fn finish(mut self, page_ids: &[ObjectId]) -> lopdf::Document {
        let kids = page_ids.iter().copied().map(Object::Reference).collect();
        self.target.objects.insert(
            self.pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(page_ids.len() as i64)),
            ])),
        );
        let catalog_id = self.target.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.target.trailer.set("Root", Object::Reference(catalog_id));
        self.target
    }
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
    Object::Array(vec![number(x0), number(y0), number(x1), number(y1)])
}

/// Whole values are written as integers so they read back exactly.
fn number(value: f64) -> Object {
    if value.fract() == 0.0 && value.abs() < i32::MAX as f64 {
        Object::Integer(value as i64)
    } else {
        Object::Real(value as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::CropBox;
    use blattwerk_core::Color;

    #[test]
    fn save_then_load_keeps_geometry_and_crop() {
        let doc = Document::load(&fixtures::pdf_with_pages(&[(612.0, 792.0), (300.0, 400.0)]))
            .unwrap();
        let cropped = doc.pages()[1]
            .with_crop(CropBox::new(0.0, 0.0, 225.0, 300.0).unwrap())
            .unwrap();
        let edited = Document::from_pages(vec![doc.pages()[0].clone(), cropped]);

        let reloaded = Document::load(&edited.to_pdf_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.page_count(), 2);
        assert_eq!(reloaded.pages()[0].width(), 612.0);
        assert_eq!(reloaded.pages()[1].crop(), CropBox::new(0.0, 0.0, 225.0, 300.0).unwrap());
        assert_eq!(
            reloaded.pages()[1].content().digest(),
            doc.pages()[1].content().digest()
        );
    }

    #[test]
    fn inherited_attributes_are_materialised() {
        let doc = Document::load(&fixtures::pdf_with_inherited_media_box(2, 500.0, 700.0)).unwrap();
        let pdf = build_pdf(&doc, false).unwrap();
        for page_id in pdf.get_pages().values() {
            let page = pdf.get_dictionary(*page_id).unwrap();
            assert!(page.get(b"MediaBox").is_ok());
            assert!(page.get(b"Resources").is_ok());
        }
    }

    #[test]
    fn offset_media_box_round_trips() {
        let doc = Document::load(&fixtures::pdf_with_offset_crop()).unwrap();
        let reloaded = Document::load(&doc.to_pdf_bytes().unwrap()).unwrap();
        assert_eq!(reloaded, doc);
    }

    #[test]
    fn repeated_page_is_written_twice() {
        let doc = Document::load(&fixtures::pdf_with_pages(&[(100.0, 100.0)])).unwrap();
        let twice = Document::from_pages(vec![doc.pages()[0].clone(), doc.pages()[0].clone()]);
        let pdf = build_pdf(&twice, false).unwrap();
        let ids: Vec<_> = pdf.get_pages().values().copied().collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn marks_are_written_as_text() {
        let page = Page::blank(612.0, 792.0).with_mark(TextMark {
            text: "Stamped".into(),
            x: 462.0,
            y: 50.0,
            font_size: 12.0,
            color: Color::BLUE,
        });
        let bytes = Document::from_pages(vec![page]).to_pdf_bytes().unwrap();
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        let text = pdf.extract_text(&[1]).unwrap();
        assert!(text.contains("Stamped"), "extracted: {text:?}");
    }

    #[test]
    fn popup_keeps_link_to_its_annotation() {
        let doc = Document::load(&fixtures::pdf_with_popup_annotation()).unwrap();
        let pdf = build_pdf(&doc, false).unwrap();
        let page_id = *pdf.get_pages().values().next().unwrap();
        let annots = pdf
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .and_then(Object::as_array)
            .unwrap()
            .clone();
        let markup = annots[0].as_reference().unwrap();
        let popup = pdf.get_dictionary(annots[1].as_reference().unwrap()).unwrap();
        assert_eq!(popup.get(b"Parent").unwrap().as_reference().unwrap(), markup);

        let markup = pdf.get_dictionary(markup).unwrap();
        assert_eq!(markup.get(b"P").unwrap().as_reference().unwrap(), page_id);
    }

    #[test]
    fn empty_document_writes_valid_pdf() {
        let bytes = Document::default().to_pdf_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(Document::load(&bytes).unwrap().is_empty());
    }
}
