// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — an ordered sequence of pages with geometry, crop, stamped
// text marks, and opaque content.
//
// Pages are plain values. Their content points into a parsed source PDF held
// behind an `Arc` that is never mutated after construction, so cloning a
// `Document` is cheap and no operation can alter a document it was handed.

use std::fmt;
use std::sync::{Arc, OnceLock};

use blattwerk_core::Color;
use blattwerk_core::error::{BlattwerkError, Result};
use lopdf::{Dictionary, Object, ObjectId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Page-relative crop rectangle `(x0, y0)`–`(x1, y1)` in PDF units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl CropBox {
    /// Build a crop box, rejecting inverted or non-finite corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(BlattwerkError::Validation(
                "crop box coordinates must be finite".into(),
            ));
        }
        if x1 < x0 || y1 < y0 {
            return Err(BlattwerkError::Validation(format!(
                "crop box ({x0}, {y0}, {x1}, {y1}) is inverted"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// The crop box covering a whole `width` x `height` page.
    pub fn full(width: f64, height: f64) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: width.max(0.0),
            y1: height.max(0.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Whether the box lies inside `(0, 0, width, height)`.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x0 >= 0.0 && self.y0 >= 0.0 && self.x1 <= width && self.y1 <= height
    }

    /// Clamp every corner into `(0, 0, width, height)`.
    pub fn clamped(&self, width: f64, height: f64) -> Self {
        let w = width.max(0.0);
        let h = height.max(0.0);
        let x0 = self.x0.clamp(0.0, w);
        let y0 = self.y0.clamp(0.0, h);
        Self {
            x0,
            y0,
            x1: self.x1.clamp(x0, w),
            y1: self.y1.clamp(y0, h),
        }
    }
}

/// A string stamped onto a page, positioned from the page's bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMark {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: Color,
}

/// A parsed PDF that page content points into.
pub struct SourceDocument {
    id: Uuid,
    pdf: lopdf::Document,
}

impl SourceDocument {
    pub fn new(pdf: lopdf::Document) -> Self {
        Self {
            id: Uuid::new_v4(),
            pdf,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pdf(&self) -> &lopdf::Document {
        &self.pdf
    }
}

/// Opaque page content: a page object inside a shared source PDF.
#[derive(Clone)]
pub struct PageContent {
    source: Arc<SourceDocument>,
    page_id: ObjectId,
    /// Lower-left corner of the source media box.
    origin: (f64, f64),
    /// SHA-256 of the decoded content stream.
    digest: String,
}

impl PageContent {
    pub(crate) fn from_source(
        source: Arc<SourceDocument>,
        page_id: ObjectId,
        origin: (f64, f64),
    ) -> Self {
        let bytes = source.pdf.get_page_content(page_id).unwrap_or_default();
        let digest = hex::encode(Sha256::digest(&bytes));
        Self {
            source,
            page_id,
            origin,
            digest,
        }
    }

    /// Content of a page with nothing drawn on it.
    pub fn blank() -> Self {
        static BLANK: OnceLock<(Arc<SourceDocument>, ObjectId)> = OnceLock::new();
        let (source, page_id) = BLANK.get_or_init(build_blank_source);
        Self::from_source(Arc::clone(source), *page_id, (0.0, 0.0))
    }

    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl PartialEq for PageContent {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.digest == other.digest
    }
}

impl fmt::Debug for PageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContent")
            .field("source", &self.source.id)
            .field("page_id", &self.page_id)
            .field("origin", &self.origin)
            .field("digest", &&self.digest[..12])
            .finish()
    }
}

fn build_blank_source() -> (Arc<SourceDocument>, ObjectId) {
    let mut pdf = lopdf::Document::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let page_id = pdf.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Resources", Object::Dictionary(Dictionary::new())),
    ]));
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = pdf.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    pdf.trailer.set("Root", Object::Reference(catalog_id));
    (Arc::new(SourceDocument::new(pdf)), page_id)
}

/// One page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    width: f64,
    height: f64,
    crop: CropBox,
    marks: Vec<TextMark>,
    content: PageContent,
}

impl Page {
    pub(crate) fn from_parts(width: f64, height: f64, crop: CropBox, content: PageContent) -> Self {
        Self {
            width,
            height,
            crop: crop.clamped(width, height),
            marks: Vec::new(),
            content,
        }
    }

    /// An uncropped page with no content.
    pub fn blank(width: f64, height: f64) -> Self {
        Self::from_parts(width, height, CropBox::full(width, height), PageContent::blank())
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn crop(&self) -> CropBox {
        self.crop
    }

    pub fn marks(&self) -> &[TextMark] {
        &self.marks
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Copy of this page with a new crop box, which must lie inside the page.
    pub fn with_crop(&self, crop: CropBox) -> Result<Self> {
        if !crop.is_within(self.width, self.height) {
            return Err(BlattwerkError::Validation(format!(
                "crop box {crop:?} exceeds page bounds {}x{}",
                self.width, self.height
            )));
        }
        Ok(Self {
            crop,
            ..self.clone()
        })
    }

    /// Copy of this page with `mark` stamped on top of existing marks.
    pub fn with_mark(&self, mark: TextMark) -> Self {
        let mut page = self.clone();
        page.marks.push(mark);
        page
    }

    pub(crate) fn with_content(&self, content: PageContent) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }
}

/// An ordered sequence of pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Parse raw PDF bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        crate::pdf::reader::load_document(data)
    }

    /// Serialise into a standalone PDF.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        crate::pdf::writer::write_document(self)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
