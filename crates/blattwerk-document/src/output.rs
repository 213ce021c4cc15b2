// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download contract — finished bytes with a MIME type and a suggested name.

use blattwerk_core::DocumentType;

/// Name offered when the original file name is unknown.
pub const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Final bytes of an engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalBlob {
    document_type: DocumentType,
    bytes: Vec<u8>,
}

impl TerminalBlob {
    pub fn new(document_type: DocumentType, bytes: Vec<u8>) -> Self {
        Self {
            document_type,
            bytes,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn mime_type(&self) -> &'static str {
        self.document_type.mime_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A blob ready to hand to the user, with its suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub blob: TerminalBlob,
    pub file_name: String,
}

impl ProcessedFile {
    pub fn new(blob: TerminalBlob, original_name: &str) -> Self {
        Self {
            blob,
            file_name: processed_file_name(original_name),
        }
    }
}

/// `processed_<original>`, where a blank original becomes `document.pdf`.
pub fn processed_file_name(original: &str) -> String {
    let original = original.trim();
    let base = if original.is_empty() {
        FALLBACK_FILE_NAME
    } else {
        original
    };
    format!("processed_{base}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_prefixed() {
        assert_eq!(processed_file_name("report.pdf"), "processed_report.pdf");
        assert_eq!(processed_file_name("  "), "processed_document.pdf");
    }

    #[test]
    fn blob_exposes_mime_type() {
        let file = ProcessedFile::new(
            TerminalBlob::new(DocumentType::PlainText, b"hello".to_vec()),
            "notes.pdf",
        );
        assert_eq!(file.blob.mime_type(), "text/plain");
        assert_eq!(file.file_name, "processed_notes.pdf");
    }
}
