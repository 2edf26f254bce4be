//! Structured diagnostic events emitted while a card is being built.
//!
//! Inject an [`Arc<dyn DiagnosticObserver>`] via
//! [`crate::config::CardConfigBuilder::observer`] to receive one
//! [`Diagnostic`] for every branch the pipeline takes: each fetch outcome,
//! each skipped or placed slot, and the compositing result.
//!
//! Every event is also mirrored to `tracing`, so a binary that only installs
//! a subscriber still sees the same lines. The observer exists so tests and
//! embedding applications can assert on what happened without scraping log
//! output.
//!
//! # Example
//!
//! ```rust
//! use cat_card::{CardConfig, Diagnostic, DiagnosticObserver};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<Diagnostic>>);
//!
//! impl DiagnosticObserver for Recorder {
//!     fn on_event(&self, event: &Diagnostic) {
//!         self.0.lock().unwrap().push(event.clone());
//!     }
//! }
//!
//! let config = CardConfig::builder()
//!     .observer(Arc::new(Recorder::default()) as Arc<dyn DiagnosticObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FetchError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One observable step of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// The service answered with a success status and the body was read.
    FetchSucceeded { url: String, status: u16, bytes: usize },
    /// A fetch failed; the reason says which branch.
    FetchFailed(FetchError),
    /// A slot produced no image and was left out of the composite.
    SlotSkipped { index: usize, text: String },
    /// A slot's image was queued for compositing at `(x, y)`.
    SlotPlaced { index: usize, x: u32, y: u32 },
    /// Every fetch failed; the compositor is invoked with an empty list.
    NoImages,
    /// The compositor produced an encoded buffer.
    Composed { images: usize, bytes: usize },
    /// The compositor rejected its inputs; the run is aborted.
    ComposeFailed { reason: String },
}

impl Diagnostic {
    /// Short machine-readable name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::FetchSucceeded { .. } => "fetch_succeeded",
            Diagnostic::FetchFailed(FetchError::EmptyUrl) => "fetch_empty_url",
            Diagnostic::FetchFailed(FetchError::Transport { .. }) => "fetch_transport_error",
            Diagnostic::FetchFailed(FetchError::Status { .. }) => "fetch_bad_status",
            Diagnostic::SlotSkipped { .. } => "slot_skipped",
            Diagnostic::SlotPlaced { .. } => "slot_placed",
            Diagnostic::NoImages => "no_images",
            Diagnostic::Composed { .. } => "composed",
            Diagnostic::ComposeFailed { .. } => "compose_failed",
        }
    }

    /// Whether the event describes something that went wrong.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Diagnostic::FetchFailed(_)
                | Diagnostic::SlotSkipped { .. }
                | Diagnostic::NoImages
                | Diagnostic::ComposeFailed { .. }
        )
    }
}

/// Receives diagnostic events from the pipeline.
///
/// Implementations must be `Send + Sync`: with concurrent fetching enabled
/// the two fetch events may be delivered from different tasks.
pub trait DiagnosticObserver: Send + Sync {
    /// Called once per event, in the order the pipeline emits them.
    fn on_event(&self, event: &Diagnostic) {
        let _ = event;
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl DiagnosticObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::CardConfig`].
pub type Observer = Arc<dyn DiagnosticObserver>;

/// Log `event` through `tracing` and forward it to `observer`, if any.
pub(crate) fn emit(observer: Option<&Observer>, event: Diagnostic) {
    match &event {
        Diagnostic::FetchSucceeded { url, status, bytes } => {
            info!("Received response with status: {} ({} bytes from {})", status, bytes, url)
        }
        Diagnostic::FetchFailed(e) => error!("Error caught: {}", e),
        Diagnostic::SlotSkipped { index, text } => {
            warn!("Slot {} ({:?}) produced no image, skipping", index, text)
        }
        Diagnostic::SlotPlaced { index, x, y } => debug!("Slot {} placed at ({}, {})", index, x, y),
        Diagnostic::NoImages => warn!("No images fetched; compositing an empty canvas"),
        Diagnostic::Composed { images, bytes } => {
            info!("Composited {} image(s) into {} bytes", images, bytes)
        }
        Diagnostic::ComposeFailed { reason } => error!("Error caught: {}", reason),
    }

    if let Some(obs) = observer {
        obs.on_event(&event);
    }
}
