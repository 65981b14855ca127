//! Data-URL encoding for inline image previews.
//!
//! An image preview embeds the file itself in the `src` attribute rather
//! than pointing at a transient URL, so it holds no store entry and needs no
//! release. The format is RFC 2397 with the standard padded base64 alphabet.

use crate::file::OCTET_STREAM;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode `content` as `data:<media type>;base64,<payload>`.
///
/// An empty media type is written as `application/octet-stream`.
pub fn data_url(media_type: &str, content: &[u8]) -> String {
    let media_type = if media_type.is_empty() {
        OCTET_STREAM
    } else {
        media_type
    };
    let b64 = STANDARD.encode(content);
    debug!("Encoded preview → {} bytes base64", b64.len());
    format!("data:{media_type};base64,{b64}")
}
