// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — parse raw bytes into the page model using the `lopdf` crate.

use std::sync::Arc;

use blattwerk_core::error::{BlattwerkError, Result};
use lopdf::{Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::model::{CropBox, Document, Page, PageContent, SourceDocument};

/// US Letter, used when a page tree carries no media box at all.
const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Deepest `/Parent` chain followed when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Parse PDF bytes into a [`Document`].
///
/// Bytes that are not a readable PDF produce [`BlattwerkError::Load`].
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn load_document(data: &[u8]) -> Result<Document> {
    let pdf = lopdf::Document::load_mem(data)
        .map_err(|err| BlattwerkError::Load(format!("not a readable PDF: {err}")))?;

    let pages = pages_from_source(Arc::new(SourceDocument::new(pdf)));
    debug!(pages = pages.len(), "PDF loaded from bytes");

    Ok(Document::from_pages(pages))
}

/// Build one model page per entry of the source's page tree, in page order.
pub(crate) fn pages_from_source(source: Arc<SourceDocument>) -> Vec<Page> {
    // lopdf keys pages by 1-indexed page number in a BTreeMap, so values()
    // iterates in document order.
    let page_ids: Vec<ObjectId> = source.pdf().get_pages().values().copied().collect();

    page_ids
        .into_iter()
        .map(|page_id| read_page(&source, page_id))
        .collect()
}

fn read_page(source: &Arc<SourceDocument>, page_id: ObjectId) -> Page {
    let pdf = source.pdf();

    let media = inherited(pdf, page_id, b"MediaBox")
        .and_then(|obj| read_rect(pdf, obj))
        .unwrap_or_else(|| {
            warn!(?page_id, "page has no media box, assuming US Letter");
            FALLBACK_MEDIA_BOX
        });
    let [mx0, my0, mx1, my1] = media;
    let width = mx1 - mx0;
    let height = my1 - my0;

    // Crop boxes are stored in absolute coordinates; the model keeps them
    // relative to the media box origin.
    let crop = inherited(pdf, page_id, b"CropBox")
        .and_then(|obj| read_rect(pdf, obj))
        .map(|[x0, y0, x1, y1]| CropBox {
            x0: x0 - mx0,
            y0: y0 - my0,
            x1: x1 - mx0,
            y1: y1 - my0,
        })
        .unwrap_or_else(|| CropBox::full(width, height));

    let content = PageContent::from_source(Arc::clone(source), page_id, (mx0, my0));
    Page::from_parts(width, height, crop, content)
}

/// Look up `key` on the page, walking `/Parent` links for inheritable
/// attributes such as `/MediaBox` and `/Resources`.
pub(crate) fn inherited<'a>(
    pdf: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = pdf.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = pdf.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Read a four-number rectangle, normalising the corner order.
fn read_rect(pdf: &lopdf::Document, obj: &Object) -> Option<[f64; 4]> {
    let obj = match obj {
        Object::Reference(id) => pdf.get_object(*id).ok()?,
        other => other,
    };
    let Object::Array(items) = obj else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    let [ax, ay, bx, by] = values;
    Some([ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)])
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
