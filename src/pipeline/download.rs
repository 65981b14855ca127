//! Download trigger: materialise a converted payload as a saved file.
//!
//! [`DownloadTrigger::trigger`] registers the payload under a transient URL,
//! hands it to the configured [`DownloadSink`] together with the negotiated
//! filename, and revokes the URL before returning. Sinks do blocking I/O and
//! run on tokio's blocking pool. The trigger is fire-and-forget: a sink
//! failure is logged, never returned.
//!
//! [`DirectorySink`] is the sink used by the CLI. It behaves like a browser's
//! download folder: only the final path component of the suggested name is
//! used, writes go through a temporary file in the same directory and are
//! renamed into place, and an existing name gets a ` (1)`, ` (2)`, … suffix.

use crate::transient::ObjectUrlStore;
use bytes::Bytes;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Name used when a suggested filename has no usable final component.
const FALLBACK_NAME: &str = "download";

/// A download handed to a sink.
#[derive(Debug)]
pub struct Download<'a> {
    /// Transient URL the payload is registered under while the sink runs.
    pub url: &'a str,
    /// Filename negotiated with the server.
    pub filename: &'a str,
    pub content: &'a Bytes,
}

/// Where triggered downloads end up.
pub trait DownloadSink: Send + Sync {
    fn save(&self, download: &Download<'_>) -> io::Result<()>;
}

/// Turns payloads into downloads through a sink.
#[derive(Clone)]
pub struct DownloadTrigger {
    store: ObjectUrlStore,
    sink: Arc<dyn DownloadSink>,
}

impl DownloadTrigger {
    pub fn new(store: ObjectUrlStore, sink: Arc<dyn DownloadSink>) -> Self {
        Self { store, sink }
    }

    /// Save `payload` as `filename`, registered under `media_type` while the
    /// sink runs. The transient URL is released before this returns,
    /// whatever the sink does.
    pub async fn trigger(&self, payload: Bytes, filename: &str, media_type: &str) {
        let url = self.store.create(payload.clone(), media_type);
        let sink = Arc::clone(&self.sink);
        let raw_url = url.as_str().to_string();
        let name = filename.to_string();

        let saved = tokio::task::spawn_blocking(move || {
            sink.save(&Download {
                url: &raw_url,
                filename: &name,
                content: &payload,
            })
        })
        .await;

        match saved {
            Ok(Ok(())) => info!("File downloaded successfully: {}", filename),
            Ok(Err(e)) => warn!("Download of '{}' failed: {}", filename, e),
            Err(e) => warn!("Download task for '{}' did not complete: {}", filename, e),
        }
        url.revoke();
    }
}

/// Saves downloads into a directory.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Mutex<Vec<PathBuf>>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, download: &Download<'_>) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(download.content)?;
        tmp.flush()?;

        let name = safe_file_name(download.filename);
        let path = loop {
            let candidate = available_path(&self.dir, &name);
            match tmp.persist_noclobber(&candidate) {
                Ok(_) => break candidate,
                // Someone took the name between the check and the rename.
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(e.error),
            }
        };

        info!("Saved {} bytes to {}", download.content.len(), path.display());
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path);
        Ok(())
    }
}

/// Final path component of a suggested name, with either slash style.
fn safe_file_name(suggested: &str) -> String {
    let last = suggested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if last.is_empty() || last == "." || last == ".." {
        FALLBACK_NAME.to_string()
    } else {
        last.to_string()
    }
}

/// `dir/name`, or `dir/stem (n).ext` for the first free `n`.
fn available_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };
    (1u32..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
