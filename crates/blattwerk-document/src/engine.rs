// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transformation engine — pure page operations over the document model.
//
// Every operation borrows its input and builds a fresh `Document`; a failure
// returns before anything is produced, so callers never see partial output.

use std::sync::Arc;

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{Color, DocumentType, Operation};
use tracing::{debug, info, instrument};

use crate::model::{CropBox, Document, SourceDocument, TextMark};
use crate::output::TerminalBlob;
use crate::pdf::{reader, writer};

/// Factor applied to both crop extents by [`crop`].
pub const CROP_FACTOR: f64 = 0.75;

/// Text stamped by [`sign`].
pub const SIGNATURE_TEXT: &str = "Digitally Signed";

/// Body of the `convert` output when no page carries extractable text.
pub const CONVERT_FALLBACK_TEXT: &str = "PDF content converted to text format";

const SIGNATURE_RIGHT_INSET: f64 = 150.0;
const SIGNATURE_BOTTOM_OFFSET: f64 = 50.0;
const SIGNATURE_FONT_SIZE: f64 = 12.0;

/// Result of an engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    /// A further-editable document.
    Document(Document),
    /// Final bytes handed straight to the download contract.
    Blob(TerminalBlob),
}

impl EngineOutput {
    /// Downloadable bytes, serialising a document output to PDF.
    pub fn into_blob(self) -> Result<TerminalBlob> {
        match self {
            Self::Document(doc) => Ok(TerminalBlob::new(DocumentType::Pdf, doc.to_pdf_bytes()?)),
            Self::Blob(blob) => Ok(blob),
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Blob(_) => None,
        }
    }
}

/// Extra inputs for operations that need them.
#[derive(Debug, Clone, Default)]
pub struct OperationParams {
    /// Documents appended after the input by `merge`, in order.
    pub merge_with: Vec<Document>,
}

/// Apply `operation` to `document`.
#[instrument(skip(document, params), fields(pages = document.page_count()))]
pub fn apply(
    document: &Document,
    operation: Operation,
    params: &OperationParams,
) -> Result<EngineOutput> {
    let output = match operation {
        Operation::Compress => EngineOutput::Document(compress(document)?),
        Operation::Split => EngineOutput::Document(split(document)?),
        Operation::Merge => {
            let mut inputs = Vec::with_capacity(params.merge_with.len() + 1);
            inputs.push(document);
            inputs.extend(params.merge_with.iter());
            EngineOutput::Document(merge(&inputs))
        }
        Operation::Delete => EngineOutput::Document(delete_odd_pages(document)),
        Operation::Crop => EngineOutput::Document(crop(document)?),
        Operation::Sign => EngineOutput::Document(sign(document)?),
        Operation::Convert => EngineOutput::Blob(convert(document)?),
        Operation::WordToPdf => EngineOutput::Blob(word_to_pdf(document)?),
    };
    info!(%operation, "operation applied");
    Ok(output)
}

/// Apply the operation named by its wire identifier, e.g. `"word-to-pdf"`.
pub fn apply_named(
    document: &Document,
    operation: &str,
    params: &OperationParams,
) -> Result<EngineOutput> {
    apply(document, operation.parse()?, params)
}

// -- Structural operations ----------------------------------------------------

/// Rewrite every page into one compacted PDF and rebind the pages to it.
///
/// Unreachable objects are dropped, objects are renumbered contiguously and
/// streams are flate-compressed. Geometry, crop, marks and content are kept,
/// so compressing an already compressed document changes nothing observable.
#[instrument(skip_all, fields(pages = document.page_count()))]
pub fn compress(document: &Document) -> Result<Document> {
    let mut pdf = writer::build_pdf(document, false)?;
    let before = pdf.objects.len();
    pdf.prune_objects();
    pdf.renumber_objects();
    pdf.compress();
    debug!(before, after = pdf.objects.len(), "object graph compacted");

    let rebound = reader::pages_from_source(Arc::new(SourceDocument::new(pdf)));
    if rebound.len() != document.page_count() {
        return Err(BlattwerkError::Pdf(format!(
            "compaction produced {} pages from {}",
            rebound.len(),
            document.page_count()
        )));
    }

    let pages = document
        .pages()
        .iter()
        .zip(rebound)
        .map(|(page, fresh)| page.with_content(fresh.content().clone()))
        .collect();
    Ok(Document::from_pages(pages))
}

/// A single-page document holding the input's first page.
pub fn split(document: &Document) -> Result<Document> {
    let first = document
        .page(0)
        .ok_or_else(|| BlattwerkError::Validation("cannot split a document with no pages".into()))?;
    Ok(Document::from_pages(vec![first.clone()]))
}

/// Concatenate the page sequences of `documents` in order.
pub fn merge(documents: &[&Document]) -> Document {
    let pages = documents
        .iter()
        .flat_map(|doc| doc.pages().iter().cloned())
        .collect();
    Document::from_pages(pages)
}

/// Remove every page at an odd zero-based index.
///
/// Indices are removed from the highest down so that each removal leaves the
/// positions of the pages still to be visited unchanged.
pub fn delete_odd_pages(document: &Document) -> Document {
    let mut pages = document.pages().to_vec();
    let odd_indices: Vec<usize> = (0..pages.len()).filter(|index| index % 2 == 1).collect();
    for &index in odd_indices.iter().rev() {
        pages.remove(index);
    }
    debug!(removed = odd_indices.len(), remaining = pages.len(), "odd pages removed");
    Document::from_pages(pages)
}

/// Shrink every page's crop to `CROP_FACTOR` of its current extent, anchored
/// at the page origin.
///
/// Applying this twice leaves `0.5625` of an uncropped page's size. A page
/// that already carries an offset crop keeps only that crop's scaled width
/// and height; the new box starts at `(0, 0)` and can therefore reach outside
/// the previously visible area. A 200x250 page cropped to `(10, 10, 110, 160)`
/// becomes `(0, 0, 75, 112.5)`.
pub fn crop(document: &Document) -> Result<Document> {
    let pages = document
        .pages()
        .iter()
        .enumerate()
        .map(|(index, page)| {
            if !(page.width() > 0.0 && page.height() > 0.0) {
                return Err(BlattwerkError::Validation(format!(
                    "page {index} has non-positive size {}x{}",
                    page.width(),
                    page.height()
                )));
            }
            let current = page.crop();
            page.with_crop(CropBox::new(
                0.0,
                0.0,
                current.width() * CROP_FACTOR,
                current.height() * CROP_FACTOR,
            )?)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Document::from_pages(pages))
}

/// Stamp the signature mark near the bottom-right corner of the first page.
pub fn sign(document: &Document) -> Result<Document> {
    let first = document
        .page(0)
        .ok_or_else(|| BlattwerkError::Validation("cannot sign a document with no pages".into()))?;

    let mark = TextMark {
        text: SIGNATURE_TEXT.into(),
        x: first.width() - SIGNATURE_RIGHT_INSET,
        y: SIGNATURE_BOTTOM_OFFSET,
        font_size: SIGNATURE_FONT_SIZE,
        color: Color::BLUE,
    };

    let mut pages = document.pages().to_vec();
    pages[0] = first.with_mark(mark);
    Ok(Document::from_pages(pages))
}

// -- Terminal outputs ---------------------------------------------------------

/// Plain text extracted from every page.
pub fn convert(document: &Document) -> Result<TerminalBlob> {
    let text = if document.is_empty() {
        String::new()
    } else {
        let pdf = writer::build_pdf(document, true)?;
        let page_numbers: Vec<u32> = (1..=document.page_count() as u32).collect();
        pdf.extract_text(&page_numbers).unwrap_or_default()
    };

    let body = if text.trim().is_empty() {
        CONVERT_FALLBACK_TEXT.to_owned()
    } else {
        text
    };
    Ok(TerminalBlob::new(DocumentType::PlainText, body.into_bytes()))
}

/// The document serialised as PDF.
pub fn word_to_pdf(document: &Document) -> Result<TerminalBlob> {
    Ok(TerminalBlob::new(DocumentType::Pdf, document.to_pdf_bytes()?))
}
