//! Conversion request construction.
//!
//! Every submission is a fresh `POST` to the category's endpoint with a
//! two-part `multipart/form-data` body:
//!
//! | Part | Content |
//! |------|---------|
//! | `file` | the selected bytes, with the declared name and media type |
//! | `format` | the requested output format token, verbatim |
//!
//! The format token is not checked here; the form decides whether to check
//! it first (see [`crate::config::ClientConfig::enforce_offered_formats`]).
//! No credentials, retry or idempotency headers are attached.

use crate::category::ConversionCategory;
use crate::config::ClientConfig;
use crate::error::ConvertError;
use crate::file::SelectedFile;
use mime_guess::mime::{self, Mime};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// One submission: the file and the format it should become.
///
/// Consumed by [`build_request`]; build a new one for every submission.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub file: SelectedFile,
    pub target_format: String,
}

impl ConversionRequest {
    pub fn new(file: SelectedFile, target_format: impl Into<String>) -> Self {
        Self {
            file,
            target_format: target_format.into(),
        }
    }
}

/// Package `request` as a multipart POST to `category`'s endpoint.
pub fn build_request(
    http: &Client,
    config: &ClientConfig,
    category: ConversionCategory,
    request: ConversionRequest,
) -> Result<RequestBuilder, ConvertError> {
    let ConversionRequest {
        file,
        target_format,
    } = request;

    let url = config.endpoint_url(category.endpoint());
    let form = Form::new()
        .part("file", file_part(&file)?)
        .text("format", target_format);

    debug!(
        "POST {} (file '{}', {} bytes)",
        url,
        file.name(),
        file.size()
    );

    let mut builder = http.post(url).multipart(form);
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder)
}

/// The `file` part. Unparseable or empty media types go out as
/// `application/octet-stream`.
fn file_part(file: &SelectedFile) -> Result<Part, ConvertError> {
    let media_type = file
        .media_type()
        .parse::<Mime>()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    Part::stream_with_length(Body::from(file.content().clone()), file.size())
        .file_name(file.name().to_string())
        .mime_str(media_type.as_ref())
        .map_err(|e| ConvertError::TransportError {
            cause: format!("invalid media type '{}': {}", media_type, e),
        })
}
