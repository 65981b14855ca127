//! The conversion form: one component, parameterised by category.
//!
//! A [`ConversionForm`] is what each of the four converter sections used to
//! be: a file slot, a preview area and a submit action. Inputs arrive
//! through explicit calls ([`ConversionForm::select`],
//! [`ConversionForm::submit`]) and outputs leave through the configured
//! observer and download sink; the form reaches for no ambient state.
//!
//! ## Submission
//!
//! ```text
//! submit(format)
//!  ├─ in-flight guard   second submit while one is pending → SubmissionInFlight
//!  ├─ validate          MissingFile / FileTooLarge
//!  ├─ offered format    UnsupportedFormat (when enforced)
//!  ├─ request → server → outcome
//!  └─ Success → download trigger;  otherwise ServerError / TransportError
//! ```
//!
//! Every failure is terminal and reported once through
//! [`ConversionObserver::on_failure`] with its user-facing message.

use crate::category::ConversionCategory;
use crate::client::ConversionClient;
use crate::config::ClientConfig;
use crate::error::ConvertError;
use crate::events::{ConversionObserver, NoopObserver};
use crate::file::SelectedFile;
use crate::pipeline::download::{DownloadSink, DownloadTrigger};
use crate::pipeline::preview::{PreviewRenderer, PreviewState};
use crate::pipeline::request::ConversionRequest;
use crate::pipeline::response::ConversionOutcome;
use crate::pipeline::validate::validate;
use crate::transient::ObjectUrlStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

static NOOP: NoopObserver = NoopObserver;

/// A finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// Name the download was triggered with.
    pub filename: String,
    /// Payload size in bytes.
    pub size: usize,
}

/// One category's form: selection slot, preview slot and submit action.
pub struct ConversionForm {
    category: ConversionCategory,
    client: Arc<ConversionClient>,
    downloads: DownloadTrigger,
    selection: Mutex<Option<SelectedFile>>,
    preview: Mutex<PreviewRenderer>,
    in_flight: AtomicBool,
}

impl ConversionForm {
    pub fn new(
        category: ConversionCategory,
        client: Arc<ConversionClient>,
        store: ObjectUrlStore,
        downloads: DownloadTrigger,
    ) -> Self {
        Self {
            category,
            client,
            downloads,
            selection: Mutex::new(None),
            preview: Mutex::new(PreviewRenderer::new(category, store)),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn category(&self) -> ConversionCategory {
        self.category
    }

    /// Replace the selected file (or clear it) and re-render the preview.
    pub fn select(&self, file: Option<SelectedFile>) -> PreviewState {
        self.observer()
            .on_selected(self.category, file.as_ref().map(SelectedFile::name));
        let state = lock(&self.preview).render(file.as_ref());
        *lock(&self.selection) = file;
        state
    }

    /// The file currently in the selection slot.
    pub fn selection(&self) -> Option<SelectedFile> {
        lock(&self.selection).clone()
    }

    /// Whether a submission from this form is awaiting its outcome.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Convert the selected file to `target_format` and trigger its download.
    pub async fn submit(&self, target_format: &str) -> Result<Converted, ConvertError> {
        info!("{} conversion form submitted", self.category);
        let result = self.run(target_format).await;
        if let Err(ref e) = result {
            let message = e.user_message(self.category);
            error!("{} conversion failed: {}", self.category, e);
            self.observer().on_failure(self.category, &message);
        }
        result
    }

    async fn run(&self, target_format: &str) -> Result<Converted, ConvertError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(
            ConvertError::SubmissionInFlight {
                category: self.category,
            },
        )?;

        let selection = self.selection();
        let file = validate(selection.as_ref(), self.category)?;

        let config = self.client.config();
        if config.enforce_offered_formats && !self.category.offers(target_format) {
            return Err(ConvertError::UnsupportedFormat {
                category: self.category,
                format: target_format.to_string(),
                offered: self
                    .category
                    .offered_formats()
                    .join(", ")
                    .to_ascii_uppercase(),
            });
        }

        info!(
            "Converting '{}' ({} bytes) to {}",
            file.name(),
            file.size(),
            target_format
        );
        self.observer()
            .on_submit(self.category, file.name(), file.size(), target_format);

        let request = ConversionRequest::new(file.clone(), target_format);
        let outcome = self.client.convert(self.category, request).await;
        self.observer().on_response(self.category, &outcome);

        match outcome {
            ConversionOutcome::Success {
                payload,
                suggested_filename,
            } => {
                let size = payload.len();
                let media_type = self.category.media_type_for(target_format);
                self.downloads
                    .trigger(payload, &suggested_filename, media_type)
                    .await;
                self.observer()
                    .on_download(self.category, &suggested_filename, size);
                Ok(Converted {
                    filename: suggested_filename,
                    size,
                })
            }
            ConversionOutcome::ServerError { http_status } => {
                Err(ConvertError::ServerError { status: http_status })
            }
            ConversionOutcome::TransportError { cause } => {
                Err(ConvertError::TransportError { cause })
            }
        }
    }

    fn observer(&self) -> &dyn ConversionObserver {
        self.client.config().observer.as_deref().unwrap_or(&NOOP)
    }
}

/// The four forms of a converter page, sharing one client and URL store.
pub struct ConversionForms {
    image: ConversionForm,
    audio: ConversionForm,
    video: ConversionForm,
    document: ConversionForm,
    store: ObjectUrlStore,
}

impl ConversionForms {
    pub fn new(config: ClientConfig, sink: Arc<dyn DownloadSink>) -> Result<Self, ConvertError> {
        let client = Arc::new(ConversionClient::new(config)?);
        let store = ObjectUrlStore::new();
        let downloads = DownloadTrigger::new(store.clone(), sink);
        let form = |category| {
            ConversionForm::new(category, Arc::clone(&client), store.clone(), downloads.clone())
        };

        Ok(Self {
            image: form(ConversionCategory::Image),
            audio: form(ConversionCategory::Audio),
            video: form(ConversionCategory::Video),
            document: form(ConversionCategory::Document),
            store,
        })
    }

    pub fn form(&self, category: ConversionCategory) -> &ConversionForm {
        match category {
            ConversionCategory::Image => &self.image,
            ConversionCategory::Audio => &self.audio,
            ConversionCategory::Video => &self.video,
            ConversionCategory::Document => &self.document,
        }
    }

    /// The URL table every preview slot and download uses.
    pub fn url_store(&self) -> &ObjectUrlStore {
        &self.store
    }
}

/// Holds a form's in-flight flag; clears it on drop.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
