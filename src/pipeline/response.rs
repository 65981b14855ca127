//! Response interpretation: one terminal [`ConversionOutcome`] per request.
//!
//! ## Filename negotiation
//!
//! A success response may carry `Content-Disposition` with a quoted
//! `filename="..."`; the captured text is used verbatim. When the header is
//! absent, unquoted, or otherwise does not match, the name is synthesised as
//! `converted.<target format>` from the exact token the user selected. The
//! same policy applies to every category.
//!
//! Non-success statuses are classified without reading the body. Anything
//! that prevents a complete response (refused connection, reset, timeout,
//! truncated body) is a transport error. Nothing is retried.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Response;
use tracing::{debug, info, warn};

static RE_QUOTED_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"filename="(.+)""#).unwrap());

/// Result of one conversion request. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 2xx with a fully read body.
    Success {
        payload: Bytes,
        suggested_filename: String,
    },
    /// Any other status. The body was not read.
    ServerError { http_status: u16 },
    /// No complete response was obtained.
    TransportError { cause: String },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }
}

/// Classify the result of sending a conversion request.
pub async fn interpret(
    sent: Result<Response, reqwest::Error>,
    target_format: &str,
) -> ConversionOutcome {
    let response = match sent {
        Ok(r) => r,
        Err(e) => {
            warn!("Conversion request failed: {}", e);
            return ConversionOutcome::TransportError {
                cause: describe(&e),
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!("Server responded with an error. Status: {}", status.as_u16());
        return ConversionOutcome::ServerError {
            http_status: status.as_u16(),
        };
    }

    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let suggested_filename = suggested_filename(disposition.as_deref(), target_format);

    let payload = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!("Failed to read conversion response body: {}", e);
            return ConversionOutcome::TransportError {
                cause: describe(&e),
            };
        }
    };

    info!(
        "Server response OK: {} bytes as '{}'",
        payload.len(),
        suggested_filename
    );
    ConversionOutcome::Success {
        payload,
        suggested_filename,
    }
}

/// Pick the download name from a `Content-Disposition` value.
pub fn suggested_filename(content_disposition: Option<&str>, target_format: &str) -> String {
    match content_disposition {
        Some(value) => match RE_QUOTED_FILENAME.captures(value) {
            Some(caps) => {
                debug!("Filename extracted from header: {}", &caps[1]);
                caps[1].to_string()
            }
            None => {
                warn!("Filename not found in Content-Disposition header");
                synthesized_filename(target_format)
            }
        },
        None => {
            debug!("Content-Disposition header is missing");
            synthesized_filename(target_format)
        }
    }
}

/// `converted.<target format>`, with the format exactly as given.
pub fn synthesized_filename(target_format: &str) -> String {
    format!("converted.{target_format}")
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    }
}
