// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-document — Document model and transformation engine for Blattwerk.
//
// Loads PDFs into an immutable page model, applies the closed set of page
// operations (compress, split, merge, delete, crop, sign, convert,
// word-to-pdf), and hands results to the caller as downloadable blobs.

pub mod engine;
pub mod model;
pub mod output;
pub mod pdf;
pub mod session;

#[cfg(test)]
mod fixtures;

pub use engine::{EngineOutput, OperationParams, apply, apply_named};
pub use model::{CropBox, Document, Page, TextMark};
pub use output::{ProcessedFile, TerminalBlob};
pub use session::{CancelHandle, DocumentSession};
