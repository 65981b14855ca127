//! Observer trait for form events and user-facing alerts.
//!
//! Inject an [`Arc<dyn ConversionObserver>`] via
//! [`crate::config::ClientConfigBuilder::observer`] to receive events as a
//! form handles selections and submissions. [`ConversionObserver::on_failure`]
//! is where the one alert per failed submission is delivered; a terminal UI
//! prints it, a GUI would show a dialog.
//!
//! # Example
//!
//! ```rust
//! use media_convert_client::{ClientConfig, ConversionCategory, ConversionObserver};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Alerts(Mutex<Vec<String>>);
//!
//! impl ConversionObserver for Alerts {
//!     fn on_failure(&self, _category: ConversionCategory, message: &str) {
//!         self.0.lock().unwrap().push(message.to_string());
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .observer(Arc::new(Alerts::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::category::ConversionCategory;
use crate::pipeline::response::ConversionOutcome;
use std::sync::Arc;

/// Called by a conversion form as it processes user actions.
///
/// Implementations must be `Send + Sync`: forms of different categories may
/// submit concurrently. All methods default to no-ops.
pub trait ConversionObserver: Send + Sync {
    /// A file was placed in (or cleared from) a form's selection slot.
    fn on_selected(&self, category: ConversionCategory, file_name: Option<&str>) {
        let _ = (category, file_name);
    }

    /// Validation passed and the request is about to be sent.
    fn on_submit(
        &self,
        category: ConversionCategory,
        file_name: &str,
        size: u64,
        target_format: &str,
    ) {
        let _ = (category, file_name, size, target_format);
    }

    /// The request resolved, successfully or not.
    fn on_response(&self, category: ConversionCategory, outcome: &ConversionOutcome) {
        let _ = (category, outcome);
    }

    /// The converted artifact was handed to the download sink.
    fn on_download(&self, category: ConversionCategory, filename: &str, size: usize) {
        let _ = (category, filename, size);
    }

    /// A submission ended in failure. `message` is the user-facing alert.
    fn on_failure(&self, category: ConversionCategory, message: &str) {
        let _ = (category, message);
    }
}

/// Observer that ignores everything. Used when none is configured.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type Observer = Arc<dyn ConversionObserver>;
