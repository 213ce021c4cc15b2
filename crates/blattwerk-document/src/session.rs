// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing session — one open document, engine runs off the async runtime,
// and cancellation that never disturbs the session's prior state.

use std::sync::Arc;

use blattwerk_core::Operation;
use blattwerk_core::error::{BlattwerkError, Result};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::engine::{self, EngineOutput, OperationParams};
use crate::model::Document;
use crate::output::ProcessedFile;

/// Requests cancellation of a session's in-flight run.
///
/// A cancel issued while the session is idle applies to the next run.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }
}

/// A loaded document plus the outcome of the last successful run.
pub struct DocumentSession {
    file_name: String,
    document: Document,
    last_result: Option<ProcessedFile>,
    cancel: Arc<watch::Sender<bool>>,
}

impl DocumentSession {
    /// Load `bytes` on a blocking worker and open a session over them.
    #[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
    pub async fn open(file_name: &str, bytes: Vec<u8>) -> Result<Self> {
        let document = run_blocking(move || Document::load(&bytes)).await?;
        info!(pages = document.page_count(), "document opened");
        Ok(Self {
            file_name: file_name.to_owned(),
            document,
            last_result: None,
            cancel: Arc::new(watch::channel(false).0),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The document later runs start from.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn last_result(&self) -> Option<&ProcessedFile> {
        self.last_result.as_ref()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancel),
        }
    }

    /// Run `operation` against the current document.
    ///
    /// On success the result becomes the session's last result, and a
    /// document-yielding operation also becomes the new current document.
    /// Failure or cancellation leaves both untouched.
    #[instrument(skip(self, params), fields(file = %self.file_name))]
    pub async fn process(
        &mut self,
        operation: Operation,
        params: OperationParams,
    ) -> Result<&ProcessedFile> {
        let mut cancelled = self.cancel.subscribe();
        let input = self.document.clone();
        let task = tokio::task::spawn_blocking(move || {
            let output = engine::apply(&input, operation, &params)?;
            let next = output.as_document().cloned();
            Ok::<_, BlattwerkError>((next, output.into_blob()?))
        });

        let outcome = tokio::select! {
            biased;
            _ = cancelled.wait_for(|flag| *flag) => None,
            joined = task => Some(joined),
        };
        self.cancel.send_replace(false);

        let Some(joined) = outcome else {
            warn!(%operation, "run cancelled, result discarded");
            return Err(BlattwerkError::Cancelled);
        };
        let (next, blob) = joined
            .map_err(|err| BlattwerkError::Pdf(format!("processing task failed: {err}")))??;

        if let Some(document) = next {
            self.document = document;
        }
        info!(%operation, bytes = blob.bytes().len(), "run complete");
        Ok(self
            .last_result
            .insert(ProcessedFile::new(blob, &self.file_name)))
    }

    /// Run a raw engine call without touching session state.
    pub async fn preview(&self, operation: Operation) -> Result<EngineOutput> {
        let input = self.document.clone();
        run_blocking(move || engine::apply(&input, operation, &OperationParams::default())).await
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| BlattwerkError::Pdf(format!("blocking task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    async fn open_letter(pages: usize) -> DocumentSession {
        let bytes = fixtures::pdf_with_pages(&vec![(612.0, 792.0); pages]);
        DocumentSession::open("report.pdf", bytes).await.unwrap()
    }

    #[tokio::test]
    async fn open_rejects_non_pdf_bytes() {
        let result = DocumentSession::open("photo.pdf", b"GIF89a".to_vec()).await;
        assert!(matches!(result, Err(BlattwerkError::Load(_))));
    }

    #[tokio::test]
    async fn process_records_result_and_chains_documents() {
        let mut session = open_letter(4).await;
        let file = session
            .process(Operation::Delete, OperationParams::default())
            .await
            .unwrap();
        assert_eq!(file.file_name, "processed_report.pdf");
        assert_eq!(file.blob.mime_type(), "application/pdf");
        assert_eq!(session.document().page_count(), 2);

        session
            .process(Operation::Convert, OperationParams::default())
            .await
            .unwrap();
        assert_eq!(session.document().page_count(), 2);
        assert_eq!(session.last_result().unwrap().blob.mime_type(), "text/plain");
    }

    #[tokio::test]
    async fn cancelled_run_keeps_prior_state() {
        let mut session = open_letter(3).await;
        session
            .process(Operation::Crop, OperationParams::default())
            .await
            .unwrap();
        let before_doc = session.document().clone();
        let before_result = session.last_result().cloned();

        session.cancel_handle().cancel();
        let result = session
            .process(Operation::Delete, OperationParams::default())
            .await;
        assert!(matches!(result, Err(BlattwerkError::Cancelled)));
        assert_eq!(session.document(), &before_doc);
        assert_eq!(session.last_result().cloned(), before_result);

        // The flag is cleared once the cancelled run has been discarded.
        session
            .process(Operation::Delete, OperationParams::default())
            .await
            .unwrap();
        assert_eq!(session.document().page_count(), 2);
    }

    #[tokio::test]
    async fn failed_run_keeps_prior_state() {
        let mut session = DocumentSession::open("empty.pdf", fixtures::pdf_with_pages(&[]))
            .await
            .unwrap();
        let result = session
            .process(Operation::Sign, OperationParams::default())
            .await;
        assert!(matches!(result, Err(BlattwerkError::Validation(_))));
        assert!(session.last_result().is_none());
    }

    #[tokio::test]
    async fn preview_does_not_touch_session() {
        let session = open_letter(2).await;
        let output = session.preview(Operation::Split).await.unwrap();
        assert_eq!(output.as_document().unwrap().page_count(), 1);
        assert_eq!(session.document().page_count(), 2);
        assert!(session.last_result().is_none());
    }
}
