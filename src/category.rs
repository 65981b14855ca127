//! The four media categories and everything fixed per category.
//!
//! A category is the only "configuration" a form has: the endpoint it posts
//! to, the size ceiling its validator enforces, the output formats it
//! offers, and how its preview slot renders a selection. All of it is
//! static; there is nothing to load or override at runtime.

use crate::file::SelectedFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIB: u64 = 1024 * 1024;

/// One of the media kinds a conversion form handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionCategory {
    Image,
    Audio,
    Video,
    Document,
}

/// How a category's preview slot renders a selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStrategy {
    /// Inline data URL into an image element. Any selection renders.
    InlineData,
    /// Transient URL bound to an audio element.
    AudioPlayback,
    /// Transient URL bound to a video element.
    VideoPlayback,
    /// Transient URL into an embedded frame, only for `.pdf` names.
    PdfOnly,
}

impl ConversionCategory {
    /// Every category, in menu order.
    pub const ALL: [ConversionCategory; 4] = [
        ConversionCategory::Image,
        ConversionCategory::Audio,
        ConversionCategory::Video,
        ConversionCategory::Document,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConversionCategory::Image => "image",
            ConversionCategory::Audio => "audio",
            ConversionCategory::Video => "video",
            ConversionCategory::Document => "document",
        }
    }

    /// Article + noun used in prompts, e.g. "an image file".
    pub fn file_noun(self) -> &'static str {
        match self {
            ConversionCategory::Image => "an image file",
            ConversionCategory::Audio => "an audio file",
            ConversionCategory::Video => "a video file",
            ConversionCategory::Document => "a document file",
        }
    }

    /// Path of the conversion endpoint, relative to the server root.
    pub fn endpoint(self) -> &'static str {
        match self {
            ConversionCategory::Image => "/api/convert",
            ConversionCategory::Audio => "/api/audio/convert",
            ConversionCategory::Video => "/api/video/convert",
            ConversionCategory::Document => "/api/document/convert",
        }
    }

    /// Size ceiling in bytes. `None` means no client-side limit.
    pub fn max_size(self) -> Option<u64> {
        match self {
            ConversionCategory::Image => None,
            ConversionCategory::Audio => Some(50 * MIB),
            ConversionCategory::Video => Some(200 * MIB),
            ConversionCategory::Document => Some(50 * MIB),
        }
    }

    /// Output formats offered in the category's format picker.
    pub fn offered_formats(self) -> &'static [&'static str] {
        match self {
            ConversionCategory::Image => &["jpg", "jpeg", "png", "bmp", "tiff", "webp"],
            ConversionCategory::Audio => &["mp3", "wav"],
            ConversionCategory::Video => &["mp4", "mkv", "mov", "avi", "webm"],
            ConversionCategory::Document => &["pdf", "docx", "odt"],
        }
    }

    /// Whether `format` is offered. Case-insensitive, like the server.
    pub fn offers(self, format: &str) -> bool {
        self.offered_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// The format preselected in the picker.
    pub fn default_format(self) -> &'static str {
        self.offered_formats()[0]
    }

    pub fn preview_strategy(self) -> PreviewStrategy {
        match self {
            ConversionCategory::Image => PreviewStrategy::InlineData,
            ConversionCategory::Audio => PreviewStrategy::AudioPlayback,
            ConversionCategory::Video => PreviewStrategy::VideoPlayback,
            ConversionCategory::Document => PreviewStrategy::PdfOnly,
        }
    }

    /// Media type the server labels a converted artifact with.
    pub fn media_type_for(self, format: &str) -> &'static str {
        let format = format.to_ascii_lowercase();
        match (self, format.as_str()) {
            (ConversionCategory::Image, "jpg" | "jpeg") => "image/jpeg",
            (ConversionCategory::Image, "png") => "image/png",
            (ConversionCategory::Image, "bmp") => "image/bmp",
            (ConversionCategory::Image, "tiff") => "image/tiff",
            (ConversionCategory::Image, "webp") => "image/webp",
            (ConversionCategory::Audio, "mp3") => "audio/mpeg",
            (ConversionCategory::Audio, "wav") => "audio/wav",
            (ConversionCategory::Video, "mp4") => "video/mp4",
            (ConversionCategory::Video, "mkv") => "video/x-matroska",
            (ConversionCategory::Video, "mov") => "video/quicktime",
            (ConversionCategory::Video, "avi") => "video/x-msvideo",
            (ConversionCategory::Video, "webm") => "video/webm",
            (ConversionCategory::Document, "pdf") => "application/pdf",
            (ConversionCategory::Document, "docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            (ConversionCategory::Document, "odt") => "application/vnd.oasis.opendocument.text",
            _ => "application/octet-stream",
        }
    }

    /// Guess the category a file belongs to.
    ///
    /// The top-level media type decides for images, audio and video;
    /// documents are recognised by extension or by their office media types.
    pub fn detect(file: &SelectedFile) -> Option<ConversionCategory> {
        let media_type = file.media_type().to_ascii_lowercase();
        if media_type.starts_with("image/") {
            return Some(ConversionCategory::Image);
        }
        if media_type.starts_with("audio/") {
            return Some(ConversionCategory::Audio);
        }
        if media_type.starts_with("video/") {
            return Some(ConversionCategory::Video);
        }

        let is_document_type = media_type == "application/pdf"
            || media_type == "application/msword"
            || media_type == "application/rtf"
            || media_type == "text/plain"
            || media_type.starts_with("application/vnd.openxmlformats-officedocument")
            || media_type.starts_with("application/vnd.oasis.opendocument");
        if is_document_type {
            return Some(ConversionCategory::Document);
        }

        match file.extension().map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("pdf" | "docx" | "odt" | "doc" | "rtf" | "txt") => {
                Some(ConversionCategory::Document)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConversionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConversionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConversionCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown category '{s}' (expected image, audio, video or document)")
            })
    }
}
