//! Local previews of a selection, without network access.
//!
//! Each form owns one [`PreviewRenderer`] slot. Rendering a new selection
//! first releases the URL held for the previous one, so a slot never holds
//! more than one live transient URL no matter how many times the user
//! re-selects. Dropping the renderer releases whatever it still holds.
//!
//! | Strategy | Selection | Result |
//! |----------|-----------|--------|
//! | inline data | any file | data URL into an image element |
//! | audio / video playback | any file | transient URL into a player |
//! | pdf only | name ends in `pdf` (any case) | transient URL into a frame |
//! | pdf only | any other extension | "no preview" |

use crate::category::{ConversionCategory, PreviewStrategy};
use crate::file::SelectedFile;
use crate::pipeline::encode::data_url;
use crate::transient::{ObjectUrlStore, TransientUrl};
use serde::Serialize;
use tracing::{debug, warn};

/// Element a preview is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewElement {
    Image,
    Audio,
    Video,
    Frame,
}

/// What the preview area shows after a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    /// Whether the preview element is shown. When false the "no preview"
    /// indicator is shown instead.
    pub visible: bool,
    /// Data URL or transient URL the element is bound to. `None` when hidden.
    pub source: Option<String>,
    pub element: Option<PreviewElement>,
}

impl PreviewState {
    /// Hidden preview, "no preview" indicator shown.
    pub fn none() -> Self {
        Self {
            visible: false,
            source: None,
            element: None,
        }
    }

    fn shown(element: PreviewElement, source: String) -> Self {
        Self {
            visible: true,
            source: Some(source),
            element: Some(element),
        }
    }

    pub fn shows_no_preview(&self) -> bool {
        !self.visible
    }
}

/// One form's preview slot.
#[derive(Debug)]
pub struct PreviewRenderer {
    category: ConversionCategory,
    store: ObjectUrlStore,
    active: Option<TransientUrl>,
}

impl PreviewRenderer {
    pub fn new(category: ConversionCategory, store: ObjectUrlStore) -> Self {
        Self {
            category,
            store,
            active: None,
        }
    }

    /// Render `file` into the slot, replacing whatever was shown.
    pub fn render(&mut self, file: Option<&SelectedFile>) -> PreviewState {
        // Release before acquiring: at most one live URL per slot.
        self.active = None;

        let Some(file) = file else {
            warn!("No file selected for {} preview", self.category);
            return PreviewState::none();
        };

        let state = match self.category.preview_strategy() {
            PreviewStrategy::InlineData => PreviewState::shown(
                PreviewElement::Image,
                data_url(file.media_type(), file.content()),
            ),
            PreviewStrategy::AudioPlayback => self.bind(file, PreviewElement::Audio),
            PreviewStrategy::VideoPlayback => self.bind(file, PreviewElement::Video),
            PreviewStrategy::PdfOnly => {
                let is_pdf = file
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
                if is_pdf {
                    self.bind(file, PreviewElement::Frame)
                } else {
                    warn!("No preview available for '{}'", file.name());
                    PreviewState::none()
                }
            }
        };

        debug!(
            "{} preview for '{}': visible={}",
            self.category,
            file.name(),
            state.visible
        );
        state
    }

    /// Hide the preview and release any held URL.
    pub fn clear(&mut self) -> PreviewState {
        self.render(None)
    }

    /// URL currently held by this slot, if any.
    pub fn active_url(&self) -> Option<&str> {
        self.active.as_ref().map(TransientUrl::as_str)
    }

    fn bind(&mut self, file: &SelectedFile, element: PreviewElement) -> PreviewState {
        let url = self.store.create(file.content().clone(), file.media_type());
        let state = PreviewState::shown(element, url.as_str().to_string());
        self.active = Some(url);
        state
    }
}
