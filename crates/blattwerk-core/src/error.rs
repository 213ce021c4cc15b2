// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Blattwerk.

use thiserror::Error;

/// Top-level error type for all Blattwerk operations.
///
/// History boundaries are deliberately absent: reaching the edge of the undo
/// log is a reported no-op (`HistoryStep::AtBoundary`), not a failure.
#[derive(Debug, Error)]
pub enum BlattwerkError {
    // -- Document errors --
    #[error("failed to load document: {0}")]
    Load(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("PDF serialisation failed: {0}")]
    Pdf(String),

    #[error("operation cancelled")]
    Cancelled,

    // -- Canvas errors --
    #[error("canvas has no base raster to render onto")]
    RenderNotReady,

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("font could not be loaded: {0}")]
    Font(String),

    // -- Sharing --
    #[error("share link {0} not found")]
    ShareNotFound(String),

    #[error("share link expired at {0}")]
    ShareExpired(String),

    #[error("share link reached its access limit of {0}")]
    AccessLimitReached(u32),

    #[error("share link password rejected")]
    PasswordRejected,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlattwerkError>;
