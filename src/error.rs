//! Error types for the media-convert-client library.
//!
//! Two error types reflect two stages of a submission:
//!
//! * [`ValidationError`]: the selected file was rejected locally before any
//!   request was built. Nothing touched the network.
//!
//! * [`ConvertError`]: every terminal failure a form submission can report,
//!   including validation failures, server rejections and transport faults.
//!   None of them are retried; each maps to exactly one user-facing alert
//!   through [`ConvertError::user_message`].

use crate::category::ConversionCategory;
use std::path::PathBuf;
use thiserror::Error;

/// One mebibyte, the unit used in size-limit messages.
const MIB: u64 = 1024 * 1024;

/// A selected file failed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Submit was triggered with an empty selection slot.
    #[error("No file selected")]
    MissingFile,

    /// The file exceeds the category's size ceiling.
    #[error("File is {size} bytes, above the {limit}-byte limit")]
    FileTooLarge { size: u64, limit: u64 },
}

/// All terminal errors returned by a conversion submission.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Local rejections (no request issued) ──────────────────────────────
    /// The selected file failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested output format is not one the category offers.
    #[error("Format '{format}' is not offered for {category} conversion (offered: {offered})")]
    UnsupportedFormat {
        category: ConversionCategory,
        format: String,
        offered: String,
    },

    /// Another submission from the same form has not resolved yet.
    #[error("A {category} conversion is already in progress")]
    SubmissionInFlight { category: ConversionCategory },

    // ── Remote outcomes ───────────────────────────────────────────────────
    /// The server answered with a non-success status.
    #[error("Server responded with HTTP {status}")]
    ServerError { status: u16 },

    /// The request never produced a complete response.
    #[error("Request failed: {cause}")]
    TransportError { cause: String },

    // ── Input / config ────────────────────────────────────────────────────
    /// A local file could not be read into a selection.
    #[error("Failed to read '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConvertError {
    /// The alert shown to the user for this failure.
    pub fn user_message(&self, category: ConversionCategory) -> String {
        let noun = category.name();
        match self {
            ConvertError::Validation(ValidationError::MissingFile) => {
                format!("Please upload {}.", category.file_noun())
            }
            ConvertError::Validation(ValidationError::FileTooLarge { limit, .. }) => {
                format!("File size exceeds the limit of {} MB.", limit / MIB)
            }
            ConvertError::UnsupportedFormat { offered, .. } => {
                format!("Invalid format. Supported formats are: {}.", offered)
            }
            ConvertError::SubmissionInFlight { .. } => {
                format!("The {noun} conversion is still running. Please wait for it to finish.")
            }
            ConvertError::ServerError { .. } => {
                format!("Error converting the {noun}. Server responded with an error.")
            }
            ConvertError::TransportError { .. }
            | ConvertError::FileUnreadable { .. }
            | ConvertError::InvalidConfig(_) => {
                format!("An error occurred while converting the {noun}.")
            }
        }
    }

    /// True when the failure happened before any request was sent.
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            ConvertError::ServerError { .. } | ConvertError::TransportError { .. }
        )
    }
}
