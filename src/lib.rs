//! # media-convert-client
//!
//! Client side of a remote media conversion service: pick a file, preview it
//! locally, submit it for conversion to a target format, and save what comes
//! back.
//!
//! The service exposes one endpoint per media category (image, audio, video,
//! document). The four categories behave identically apart from a small
//! static table, so this crate implements one [`ConversionForm`] and
//! parameterises it with a [`ConversionCategory`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! select file ─▶ preview          data URL or transient URL, one per slot
//!
//! submit ─┬─ 1. Validate   file present, within the category ceiling
//!         ├─ 2. Request    multipart POST: `file` + `format`
//!         ├─ 3. Response   Success{payload, filename} | ServerError | TransportError
//!         └─ 4. Download   payload handed to a sink, transient URL released
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use media_convert_client::{
//!     ClientConfig, ConversionCategory, ConversionForms, DirectorySink, SelectedFile,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!     let forms = ConversionForms::new(config, Arc::new(DirectorySink::new("out")))?;
//!
//!     let audio = forms.form(ConversionCategory::Audio);
//!     audio.select(Some(SelectedFile::from_path("song.wav").await?));
//!     let done = audio.submit("mp3").await?;
//!     eprintln!("saved as {} ({} bytes)", done.filename, done.size);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mediaconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Categories
//!
//! | Category | Endpoint | Size limit | Formats |
//! |----------|----------|------------|---------|
//! | image    | `/api/convert`          | none    | jpg jpeg png bmp tiff webp |
//! | audio    | `/api/audio/convert`    | 50 MiB  | mp3 wav |
//! | video    | `/api/video/convert`    | 200 MiB | mp4 mkv mov avi webm |
//! | document | `/api/document/convert` | 50 MiB  | pdf docx odt |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod category;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod file;
pub mod form;
pub mod pipeline;
pub mod transient;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use category::{ConversionCategory, PreviewStrategy};
pub use client::ConversionClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConvertError, ValidationError};
pub use events::{ConversionObserver, NoopObserver, Observer};
pub use file::SelectedFile;
pub use form::{ConversionForm, ConversionForms, Converted};
pub use pipeline::download::{DirectorySink, Download, DownloadSink, DownloadTrigger};
pub use pipeline::preview::{PreviewElement, PreviewRenderer, PreviewState};
pub use pipeline::request::{build_request, ConversionRequest};
pub use pipeline::response::{interpret, suggested_filename, ConversionOutcome};
pub use pipeline::validate::validate;
pub use transient::{ObjectUrlStore, TransientUrl};
