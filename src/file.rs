//! Selected files: the content a user picked, as the form sees it.
//!
//! A [`SelectedFile`] is what a file input hands over after a selection: a
//! declared name, a declared media type and the bytes. Nothing here sniffs
//! content; the declared type is trusted the same way the server trusts it.
//! Content is held as [`Bytes`] so the preview slot and the outgoing request
//! share one buffer instead of copying a 200 MiB video twice.

use crate::error::ConvertError;
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Media type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// User-chosen binary content with its declared name and media type.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    content: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    /// Read a local file into a selection, guessing its media type from the
    /// extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ConvertError::FileUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        debug!(
            "Selected {} ({} bytes, {})",
            path.display(),
            content.len(),
            media_type
        );
        Ok(Self::new(name, media_type, content))
    }

    /// Declared file name, as chosen by the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type. May be empty when the source declared none.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Text after the last `.` of the name, or the whole name when it has no dot.
    ///
    /// `None` only for an empty name.
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit('.').next().filter(|e| !e.is_empty())
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.content.len())
            .finish()
    }
}
