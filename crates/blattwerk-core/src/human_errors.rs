// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages shown when an operation fails.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the message is presented.

use crate::error::BlattwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary problem; trying again may work.
    Transient,
    /// The user must change something (pick another file, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. an unknown operation.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether simply trying again might succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `BlattwerkError` into a `HumanError` for display.
pub fn humanize_error(err: &BlattwerkError) -> HumanError {
    match err {
        // -- Document errors --
        BlattwerkError::Load(_) => HumanError {
            message: "This file doesn't look like a PDF.".into(),
            suggestion: "Check that you picked the right file, or export it as a PDF first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BlattwerkError::UnsupportedOperation(name) => HumanError {
            message: "That tool isn't available.".into(),
            suggestion: format!("Pick one of the listed tools instead. (Requested: {name})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        BlattwerkError::Validation(detail) => HumanError {
            message: "This document can't be processed that way.".into(),
            suggestion: format!("Try a different file or tool. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BlattwerkError::Pdf(_) => HumanError {
            message: "We couldn't write the processed PDF.".into(),
            suggestion: "Try again. If it keeps failing, the original file may be damaged.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BlattwerkError::Cancelled => HumanError {
            message: "Processing was cancelled.".into(),
            suggestion: "Your previous result is unchanged. Start the tool again when ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Canvas errors --
        BlattwerkError::RenderNotReady => HumanError {
            message: "The page isn't ready for editing yet.".into(),
            suggestion: "Wait for the page to finish loading, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BlattwerkError::Image(_) => HumanError {
            message: "The page image couldn't be processed.".into(),
            suggestion: "Try a PNG or JPEG image instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BlattwerkError::Font(_) => HumanError {
            message: "The text font couldn't be loaded.".into(),
            suggestion: "Check the font setting points at a .ttf or .otf file.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Sharing --
        BlattwerkError::ShareNotFound(_) => HumanError {
            message: "This share link doesn't exist.".into(),
            suggestion: "It may have been revoked. Ask the sender for a new link.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BlattwerkError::ShareExpired(when) => HumanError {
            message: "This share link has expired.".into(),
            suggestion: format!("Ask the sender for a new link. (Expired {when})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        BlattwerkError::AccessLimitReached(limit) => HumanError {
            message: "This share link has been used too many times.".into(),
            suggestion: format!("It allowed {limit} opens. Ask the sender for a new link."),
            retriable: false,
            severity: Severity::Permanent,
        },

        BlattwerkError::PasswordRejected => HumanError {
            message: "That password isn't right.".into(),
            suggestion: "Check the password with the sender and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        BlattwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try selecting it again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Check the file's permissions, or pick another location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        BlattwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_asks_for_another_file() {
        let human = humanize_error(&BlattwerkError::Load("invalid file header".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn unknown_tool_is_permanent_and_named() {
        let human = humanize_error(&BlattwerkError::UnsupportedOperation("rotate".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("rotate"));
    }

    #[test]
    fn cancellation_is_retriable() {
        let human = humanize_error(&BlattwerkError::Cancelled);
        assert!(human.retriable);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = BlattwerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn access_limit_mentions_limit() {
        let human = humanize_error(&BlattwerkError::AccessLimitReached(10));
        assert!(human.suggestion.contains("10"));
    }
}
