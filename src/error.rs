//! Error types for the cat-card library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CardError`] is **fatal**: the card cannot be produced (invalid
//!   configuration, the compositor rejected its inputs, the output could not
//!   be written). Returned as `Err(CardError)` from the top-level `generate*`
//!   and [`crate::card::Pipeline::run`] functions.
//!
//! * [`FetchError`] is **non-fatal**: one source image could not be fetched
//!   (empty locator, connection refused, HTTP 404). The fetcher reports it as
//!   a diagnostic and hands back an absent result; the slot is skipped and the
//!   run carries on with whatever images did arrive.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cat-card library.
///
/// Per-image fetch failures use [`FetchError`] and never surface here.
#[derive(Debug, Error)]
pub enum CardError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Composition errors ────────────────────────────────────────────────
    /// A fetched buffer could not be decoded as an image.
    #[error("Image at ({x}, {y}) could not be decoded: {detail}")]
    DecodeFailed { x: u32, y: u32, detail: String },

    /// An image was placed with its origin outside the canvas.
    #[error("Image placed at ({x}, {y}) lies outside the {width}x{height} canvas")]
    PlacementOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The canvas has a zero dimension.
    #[error("Canvas dimensions must be non-zero, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    /// The canvas would need more memory than the compositor allows.
    #[error("Canvas {width}x{height} exceeds the {limit}-byte allocation limit")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },

    /// The composed canvas could not be encoded in the requested format.
    #[error("Failed to encode composite as {format}: {detail}")]
    EncodeFailed { format: String, detail: String },

    /// Any other failure reported by a compositor implementation.
    #[error("Compositing failed: {0}")]
    ComposeFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output image file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image fetch.
///
/// Never returned to callers of [`crate::pipeline::fetch::fetch_image`]; it
/// travels inside [`crate::diagnostics::Diagnostic`] events so observers can
/// tell which branch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FetchError {
    /// No locator was supplied; no request was made.
    #[error("Image URL not found")]
    EmptyUrl,

    /// Connection refused, DNS failure, timeout, or a broken body stream.
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The service answered with a non-success status.
    #[error("Can't fetch the image from '{url}': HTTP {status}")]
    Status { url: String, status: u16 },
}
